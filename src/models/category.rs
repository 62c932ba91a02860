use serde::{Deserialize, Serialize};

/// 考试分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "super::de::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl super::Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_listable(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty()
    }
}
