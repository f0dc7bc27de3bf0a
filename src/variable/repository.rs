use crate::variable::types::{DataKind, DataVariable};

/// 数据仓库变量的只读来源，执行器在每次运行开始时读取一次
pub trait DataRepository: Send + Sync {
    fn variables(&self) -> Vec<DataVariable>;
}

/// 内存中的数据仓库
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    variables: Vec<DataVariable>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_variables(variables: Vec<DataVariable>) -> Self {
        let mut repository = Self::new();
        for variable in variables {
            repository.upsert(variable);
        }
        repository
    }

    /// 插入变量，同名变量会被替换（保持原位置）
    pub fn upsert(&mut self, variable: DataVariable) {
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    /// 设置一个静态字符串变量
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.upsert(DataVariable::fixed(name, DataKind::Text, value));
    }

    pub fn get(&self, name: &str) -> Option<&DataVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl DataRepository for InMemoryRepository {
    fn variables(&self) -> Vec<DataVariable> {
        self.variables.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut repo = InMemoryRepository::new();
        repo.set("a", "1");
        repo.set("b", "2");
        repo.set("a", "3");

        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("a").unwrap().value, "3");
        assert_eq!(repo.variables()[0].name, "a");
    }

    #[test]
    fn test_from_variables_deduplicates() {
        let repo = InMemoryRepository::from_variables(vec![
            DataVariable::fixed("x", DataKind::Text, "first"),
            DataVariable::fixed("x", DataKind::Text, "second"),
        ]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get("x").unwrap().value, "second");
    }
}
