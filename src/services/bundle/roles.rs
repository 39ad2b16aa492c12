//! Recognized statement bundle files
//!
//! A [`RoleTable`] is built once at startup and passed to the selector and
//! prompt builder. Its order is the selection order.

/// A bundle file the analyzer knows how to ask about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    /// Exact entry path inside the bundle (case-sensitive)
    pub name: String,
    /// Role-specific questions appended to the per-file prompt
    pub instruction: Option<String>,
}

impl RoleSpec {
    pub fn new(name: impl Into<String>, instruction: Option<&str>) -> Self {
        Self { name: name.into(), instruction: instruction.map(str::to_string) }
    }
}

const SCHEMA_INSTRUCTION: &str = "Here is the schema file. Answer the following questions if relevant:
* What are the most common anti-patterns in the schema?";

const STATEMENT_INSTRUCTION: &str = "Here is the statement file. Answer the following questions if relevant:
* What are the most common anti-patterns in the query?";

const PLAN_INSTRUCTION: &str = "Here is the plan.txt file. Answer the following questions if relevant:
* What are the slowest operations as shown in the plan?
* What missing indexes might speed up this query?";

const ENV_INSTRUCTION: &str = "Here is the environment file. Answer the following questions if relevant:
* What version of CockroachDB is being used?
* What non-default settings are configured?";

/// Ordered table of recognized roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    roles: Vec<RoleSpec>,
}

impl Default for RoleTable {
    /// The statement bundle roles: schema, statement, plan, environment.
    fn default() -> Self {
        Self::new(vec![
            RoleSpec::new("schema.sql", Some(SCHEMA_INSTRUCTION)),
            RoleSpec::new("statement.sql", Some(STATEMENT_INSTRUCTION)),
            RoleSpec::new("plan.txt", Some(PLAN_INSTRUCTION)),
            RoleSpec::new("env.sql", Some(ENV_INSTRUCTION)),
        ])
    }
}

impl RoleTable {
    /// Build a table from an explicit list. Later duplicates of a name are dropped.
    pub fn new(roles: Vec<RoleSpec>) -> Self {
        let mut unique: Vec<RoleSpec> = Vec::with_capacity(roles.len());
        for role in roles {
            if unique.iter().any(|r| r.name == role.name) {
                tracing::warn!("Duplicate role '{}' ignored", role.name);
                continue;
            }
            unique.push(role);
        }
        Self { roles: unique }
    }

    pub fn get(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn instruction(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|r| r.instruction.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleSpec> {
        self.roles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_order() {
        let table = RoleTable::default();
        assert_eq!(table.names(), vec!["schema.sql", "statement.sql", "plan.txt", "env.sql"]);
    }

    #[test]
    fn test_default_instructions() {
        let table = RoleTable::default();
        assert!(table.instruction("plan.txt").unwrap().contains("missing indexes"));
        assert!(table.instruction("env.sql").unwrap().contains("non-default settings"));
        assert!(table.instruction("notes.txt").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = RoleTable::default();
        assert!(table.contains("schema.sql"));
        assert!(!table.contains("Schema.sql"));
        assert!(!table.contains("bundle/schema.sql"));
    }

    #[test]
    fn test_duplicate_roles_keep_first() {
        let table = RoleTable::new(vec![
            RoleSpec::new("a.sql", Some("first")),
            RoleSpec::new("b.sql", None),
            RoleSpec::new("a.sql", Some("second")),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.instruction("a.sql"), Some("first"));
        assert_eq!(table.instruction("b.sql"), None);
    }
}
