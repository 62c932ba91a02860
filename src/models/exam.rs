use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 考试
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 所属分类；按分类分组的文件里可以省略，由分组键补全
    #[serde(default, deserialize_with = "super::de::id")]
    pub category_id: String,
}

impl Exam {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category_id: category_id.into(),
        }
    }
}

impl super::Identified for Exam {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_listable(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty() && !self.category_id.is_empty()
    }
}

/// 打包的 exams.json 的两种形态
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExamFile {
    /// `[{"id": .., "categoryId": ..}, ...]`
    Flat(Vec<Exam>),
    /// `{"<categoryId>": [{"id": ..}, ...]}`
    Grouped(BTreeMap<String, Vec<Exam>>),
}

impl ExamFile {
    /// 展开为扁平列表，分组形态下缺失的 categoryId 由分组键补全
    pub fn into_exams(self) -> Vec<Exam> {
        match self {
            ExamFile::Flat(exams) => exams,
            ExamFile::Grouped(groups) => groups
                .into_iter()
                .flat_map(|(category_id, exams)| {
                    exams.into_iter().map(move |mut exam| {
                        if exam.category_id.is_empty() {
                            exam.category_id = category_id.clone();
                        }
                        exam
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_file_fills_category() {
        let json = r#"{
            "1": [{"id": 10, "name": "Prelims Mock"}],
            "2": [{"id": 20, "name": "Reasoning", "categoryId": 3}]
        }"#;
        let exams = serde_json::from_str::<ExamFile>(json).unwrap().into_exams();

        assert_eq!(exams.len(), 2);
        assert_eq!(exams[0].category_id, "1");
        // 显式声明的 categoryId 不会被覆盖
        assert_eq!(exams[1].category_id, "3");
    }

    #[test]
    fn test_flat_file() {
        let json = r#"[{"id": "a", "name": "A", "description": "d", "categoryId": "c"}]"#;
        let exams = serde_json::from_str::<ExamFile>(json).unwrap().into_exams();
        assert_eq!(exams, vec![Exam::new("a", "A", "d", "c")]);
    }
}
