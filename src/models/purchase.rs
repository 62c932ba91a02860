use crate::error::ValidationError;
use chrono::{DateTime, Duration, Months, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// 购买类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurchaseType {
    /// 整个分类
    Category,
    /// 单场考试（缓存里写作 `test` 或 `exam`）
    Test,
    /// 课程，课程 ID 与分类 ID 对应
    Course,
    /// 未知类型，不授予任何访问权限
    Other(String),
}

impl PurchaseType {
    pub fn as_str(&self) -> &str {
        match self {
            PurchaseType::Category => "category",
            PurchaseType::Test => "test",
            PurchaseType::Course => "course",
            PurchaseType::Other(s) => s,
        }
    }
}

impl From<String> for PurchaseType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "category" => PurchaseType::Category,
            "test" | "exam" => PurchaseType::Test,
            "course" => PurchaseType::Course,
            _ => PurchaseType::Other(value),
        }
    }
}

impl From<PurchaseType> for String {
    fn from(value: PurchaseType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PurchaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 有效期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseValidity {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    Lifetime,
}

/// 可接受的最长有效期（年），更长的值视为无法解析
pub const MAX_VALIDITY_YEARS: u32 = 100;

impl CourseValidity {
    /// 解析有效期字符串，如 `"6 months"`、`"1 Year"`、`"30d"`、`"12"`（按月）、`"lifetime"`
    pub fn parse(value: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^(\d+)\s*([a-z]*)\.?$").expect("有效期正则表达式无效")
        });

        let normalized = value.trim().to_lowercase();
        if matches!(normalized.as_str(), "lifetime" | "unlimited" | "forever") {
            return Some(CourseValidity::Lifetime);
        }

        let caps = re.captures(&normalized)?;
        let amount: u32 = caps[1].parse().ok()?;
        if amount == 0 {
            return None;
        }

        let validity = match &caps[2] {
            "" | "m" | "mo" | "mon" | "month" | "months" => CourseValidity::Months(amount),
            "d" | "day" | "days" => CourseValidity::Days(amount),
            "w" | "wk" | "week" | "weeks" => CourseValidity::Weeks(amount),
            "y" | "yr" | "yrs" | "year" | "years" => CourseValidity::Years(amount),
            _ => return None,
        };
        validity.within_limit().then_some(validity)
    }

    fn within_limit(self) -> bool {
        match self {
            CourseValidity::Days(n) => n <= MAX_VALIDITY_YEARS * 366,
            CourseValidity::Weeks(n) => n <= MAX_VALIDITY_YEARS * 53,
            CourseValidity::Months(n) => n <= MAX_VALIDITY_YEARS * 12,
            CourseValidity::Years(n) => n <= MAX_VALIDITY_YEARS,
            CourseValidity::Lifetime => true,
        }
    }

    /// 从开始时间计算到期时间；终身有效返回 `Ok(None)`，超出日期范围返回错误
    ///
    /// 按月和按年的计算遵循日历，超出月末时截断到月末（1 月 31 日 + 1 个月 = 2 月最后一天）
    pub fn expiry_from(
        self,
        start: DateTime<Utc>,
    ) -> std::result::Result<Option<DateTime<Utc>>, ValidationError> {
        let expiry = match self {
            CourseValidity::Days(n) => start.checked_add_signed(Duration::days(i64::from(n))),
            CourseValidity::Weeks(n) => start.checked_add_signed(Duration::weeks(i64::from(n))),
            CourseValidity::Months(n) => start.checked_add_months(Months::new(n)),
            CourseValidity::Years(n) => n
                .checked_mul(12)
                .and_then(|months| start.checked_add_months(Months::new(months))),
            CourseValidity::Lifetime => return Ok(None),
        };

        expiry.map(Some).ok_or_else(|| ValidationError::InvalidValidity {
            value: self.to_string(),
        })
    }
}

impl fmt::Display for CourseValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseValidity::Days(n) => write!(f, "{} 天", n),
            CourseValidity::Weeks(n) => write!(f, "{} 周", n),
            CourseValidity::Months(n) => write!(f, "{} 个月", n),
            CourseValidity::Years(n) => write!(f, "{} 年", n),
            CourseValidity::Lifetime => write!(f, "终身"),
        }
    }
}

/// 本地缓存的购买记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(
        default,
        deserialize_with = "super::de::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::de::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::de::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_id: Option<String>,
    pub purchase_type: PurchaseType,
    #[serde(
        default,
        deserialize_with = "super::de::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
    /// 原始有效期字符串，缺失表示终身有效
    #[serde(
        default,
        deserialize_with = "super::de::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_validity: Option<String>,
    #[serde(deserialize_with = "super::de::timestamp")]
    pub purchased_at: DateTime<Utc>,
}

impl Purchase {
    /// 记录的标识：优先 id，其次 testId、courseId
    pub fn key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.test_id.as_deref())
            .or(self.course_id.as_deref())
    }

    /// 解析有效期；缺失为终身，无法解析返回 None
    pub fn validity(&self) -> Option<CourseValidity> {
        match self.course_validity.as_deref() {
            None => Some(CourseValidity::Lifetime),
            Some(raw) => CourseValidity::parse(raw),
        }
    }

    /// 该记录覆盖的分类 ID（分类购买看 categoryId，课程购买看 courseId）
    pub fn covered_category(&self) -> Option<&str> {
        match self.purchase_type {
            PurchaseType::Category => self.category_id.as_deref().or(self.id.as_deref()),
            PurchaseType::Course => self.course_id.as_deref().or(self.category_id.as_deref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_validity() {
        assert_eq!(CourseValidity::parse("6 Months"), Some(CourseValidity::Months(6)));
        assert_eq!(CourseValidity::parse("1 year"), Some(CourseValidity::Years(1)));
        assert_eq!(CourseValidity::parse("30days"), Some(CourseValidity::Days(30)));
        assert_eq!(CourseValidity::parse("2 weeks"), Some(CourseValidity::Weeks(2)));
        assert_eq!(CourseValidity::parse("12"), Some(CourseValidity::Months(12)));
        assert_eq!(CourseValidity::parse("Lifetime"), Some(CourseValidity::Lifetime));
        assert_eq!(CourseValidity::parse("0 days"), None);
        assert_eq!(CourseValidity::parse("soon"), None);
        assert_eq!(CourseValidity::parse("3 fortnights"), None);
    }

    #[test]
    fn test_absurd_validity_is_rejected() {
        assert_eq!(CourseValidity::parse("100 years"), Some(CourseValidity::Years(100)));
        assert_eq!(CourseValidity::parse("101 years"), None);
        assert_eq!(CourseValidity::parse("4294967295 years"), None);
        assert_eq!(CourseValidity::parse("99999999 days"), None);

        // 超出日期范围不能当成终身有效
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(CourseValidity::Years(u32::MAX).expiry_from(start).is_err());
        assert!(CourseValidity::Days(u32::MAX).expiry_from(start).is_err());
        assert_eq!(CourseValidity::Lifetime.expiry_from(start), Ok(None));
    }

    #[test]
    fn test_month_arithmetic_clamps_to_month_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let expiry = CourseValidity::Months(1).expiry_from(start).unwrap().unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());

        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let next_year = CourseValidity::Years(1).expiry_from(leap).unwrap().unwrap();
        assert_eq!(next_year, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_purchase_from_cache_json() {
        let json = r#"{
            "testId": 42,
            "purchaseType": "Exam",
            "categoryId": 7,
            "courseValidity": 3,
            "purchasedAt": "2024-05-01T00:00:00Z"
        }"#;
        let purchase: Purchase = serde_json::from_str(json).unwrap();

        assert_eq!(purchase.purchase_type, PurchaseType::Test);
        assert_eq!(purchase.key(), Some("42"));
        assert_eq!(purchase.validity(), Some(CourseValidity::Months(3)));
        assert_eq!(purchase.covered_category(), None);
    }

    #[test]
    fn test_missing_validity_is_lifetime() {
        let json = r#"{"courseId": "5", "purchaseType": "course", "purchasedAt": 0}"#;
        let purchase: Purchase = serde_json::from_str(json).unwrap();

        assert_eq!(purchase.validity(), Some(CourseValidity::Lifetime));
        assert_eq!(purchase.covered_category(), Some("5"));
    }

    #[test]
    fn test_unknown_purchase_type_round_trips() {
        let purchase_type = PurchaseType::from("Bundle".to_string());
        assert_eq!(purchase_type, PurchaseType::Other("Bundle".to_string()));
        assert_eq!(String::from(purchase_type), "Bundle");
    }
}
