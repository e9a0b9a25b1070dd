use std::collections::HashMap;

use crate::catalog::TableSchema;
use crate::error::ResolveError;
use crate::plan::LogicalPlan;
use crate::resolve::ColumnValue;

/// One table visible to the current (sub)query.
#[derive(Debug, Clone)]
pub enum TableRef {
    Base {
        visible: String,
        schema: TableSchema,
    },
    /// A subquery's output under its alias; intermediate names are invisible.
    Derived {
        visible: String,
        plan: Box<LogicalPlan>,
        schema: TableSchema,
    },
}

impl TableRef {
    pub fn visible(&self) -> &str {
        match self {
            TableRef::Base { visible, .. } => visible,
            TableRef::Derived { visible, .. } => visible,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        match self {
            TableRef::Base { schema, .. } => schema,
            TableRef::Derived { schema, .. } => schema,
        }
    }
}

/// Where a bare column name points within one scope. Built once during
/// scope construction, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrigin {
    Unique(usize),
    Ambiguous(Vec<usize>),
}

/// The ordered set of tables visible to one (sub)query, plus the
/// column-name -> table mapping derived from their schemas.
///
/// Tables live in a `Vec` in FROM order: duplicate visible names (a
/// self-join without aliases) are legal and never collide.
#[derive(Debug, Clone)]
pub struct Scope {
    pub tables: Vec<TableRef>,
    columns: HashMap<String, ColumnOrigin>,
}

impl Scope {
    pub fn new(tables: Vec<TableRef>) -> Scope {
        let mut columns: HashMap<String, ColumnOrigin> = HashMap::new();
        for (index, table) in tables.iter().enumerate() {
            for key in table.schema().columns.keys() {
                match columns.get_mut(key) {
                    None => {
                        columns.insert(key.clone(), ColumnOrigin::Unique(index));
                    }
                    Some(ColumnOrigin::Unique(first)) => {
                        let origins = vec![*first, index];
                        columns.insert(key.clone(), ColumnOrigin::Ambiguous(origins));
                    }
                    Some(ColumnOrigin::Ambiguous(list)) => list.push(index),
                }
            }
        }
        Scope { tables, columns }
    }

    pub fn is_ambiguous(&self, name: &str) -> bool {
        matches!(
            self.columns.get(name.to_ascii_lowercase().as_str()),
            Some(ColumnOrigin::Ambiguous(_))
        )
    }

    fn table_by_visible(&self, visible: &str) -> Option<(usize, &TableRef)> {
        let wanted = visible.to_ascii_lowercase();
        self.tables
            .iter()
            .enumerate()
            .find(|(_, t)| t.visible().to_ascii_lowercase() == wanted)
    }

    fn column_value(&self, index: usize, written: &str) -> Option<ColumnValue> {
        let table = &self.tables[index];
        let info = table.schema().get(written)?;
        Some(ColumnValue {
            table: table.visible().to_string(),
            name: info.name.clone(),
            written: written.to_string(),
            ty: info.ty,
            cast_ty: None,
            alias: None,
        })
    }

    /// Resolve a column reference. A table-qualified name bypasses the
    /// ambiguity marker and looks up the named table directly; a bare name
    /// hitting an `Ambiguous` origin is an error listing every candidate.
    pub fn resolve(&self, qualifier: Option<&str>, name: &str) -> Result<ColumnValue, ResolveError> {
        if let Some(qualifier) = qualifier {
            let (index, table) = self
                .table_by_visible(qualifier)
                .ok_or_else(|| ResolveError::UnknownTable(qualifier.to_string()))?;
            return self.column_value(index, name).ok_or_else(|| ResolveError::UnknownColumn {
                name: name.to_string(),
                table: Some(table.visible().to_string()),
            });
        }

        match self.columns.get(name.to_ascii_lowercase().as_str()) {
            None => Err(ResolveError::UnknownColumn { name: name.to_string(), table: None }),
            Some(ColumnOrigin::Unique(index)) => Ok(self
                .column_value(*index, name)
                .expect("column map points at a schema column")),
            Some(ColumnOrigin::Ambiguous(origins)) => Err(ResolveError::AmbiguousReference {
                name: name.to_string(),
                tables: origins.iter().map(|i| self.tables[*i].visible().to_string()).collect(),
            }),
        }
    }

    /// Expand `*` (or `alias.*`) to every column of every matching table,
    /// in FROM order. Names colliding across tables keep both columns and
    /// get table-qualified labels; `*` itself is never ambiguous.
    pub fn expand_star(&self, qualifier: Option<&str>) -> Result<Vec<ColumnValue>, ResolveError> {
        let indices: Vec<usize> = match qualifier {
            Some(qualifier) => {
                let (index, _) = self
                    .table_by_visible(qualifier)
                    .ok_or_else(|| ResolveError::UnknownTable(qualifier.to_string()))?;
                vec![index]
            }
            None => (0..self.tables.len()).collect(),
        };

        let mut out = Vec::new();
        for index in indices {
            let table = &self.tables[index];
            for info in table.schema().columns.values() {
                let mut column = ColumnValue {
                    table: table.visible().to_string(),
                    name: info.name.clone(),
                    written: info.name.clone(),
                    ty: info.ty,
                    cast_ty: None,
                    alias: None,
                };
                if qualifier.is_none() && self.tables.len() > 1 && self.is_ambiguous(&info.name) {
                    column.alias = Some(format!("{}.{}", table.visible(), info.name));
                }
                out.push(column);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqlType;

    fn fires() -> TableSchema {
        TableSchema::new("forest_fires")
            .with_column("temp", SqlType::Float64)
            .with_column("RH", SqlType::Int64)
            .with_column("wind", SqlType::Float64)
    }

    fn digimon() -> TableSchema {
        TableSchema::new("digimon_mon_list")
            .with_column("Attribute", SqlType::String)
            .with_column("wind", SqlType::Float64)
    }

    fn base(visible: &str, schema: TableSchema) -> TableRef {
        TableRef::Base { visible: visible.into(), schema }
    }

    #[test]
    fn bare_name_resolves_when_unique() {
        let scope = Scope::new(vec![base("forest_fires", fires())]);
        let col = scope.resolve(None, "temp").expect("unique column");
        assert_eq!(col.table, "forest_fires");
        assert_eq!(col.name, "temp");
        assert_eq!(col.ty, SqlType::Float64);
    }

    #[test]
    fn bare_name_in_two_tables_is_ambiguous_until_qualified() {
        let scope = Scope::new(vec![base("f", fires()), base("d", digimon())]);
        match scope.resolve(None, "wind") {
            Err(ResolveError::AmbiguousReference { name, tables }) => {
                assert_eq!(name, "wind");
                assert_eq!(tables, vec!["f".to_string(), "d".to_string()]);
            }
            other => panic!("expected AmbiguousReference, got {other:?}"),
        }
        // qualification bypasses the marker
        let col = scope.resolve(Some("d"), "wind").expect("qualified lookup");
        assert_eq!(col.table, "d");
    }

    #[test]
    fn lookup_is_case_insensitive_and_keeps_catalog_case() {
        let scope = Scope::new(vec![base("forest_fires", fires())]);
        let col = scope.resolve(None, "rh").expect("case-insensitive");
        assert_eq!(col.name, "RH");
        assert_eq!(col.written, "rh");
    }

    #[test]
    fn unknown_names_report_table_context() {
        let scope = Scope::new(vec![base("f", fires())]);
        assert_eq!(
            scope.resolve(Some("x"), "temp").unwrap_err(),
            ResolveError::UnknownTable("x".into())
        );
        assert_eq!(
            scope.resolve(Some("f"), "nope").unwrap_err(),
            ResolveError::UnknownColumn { name: "nope".into(), table: Some("f".into()) }
        );
        assert_eq!(
            scope.resolve(None, "nope").unwrap_err(),
            ResolveError::UnknownColumn { name: "nope".into(), table: None }
        );
    }

    #[test]
    fn star_expansion_keeps_both_copies_in_self_join() {
        let scope = Scope::new(vec![base("table1", fires()), base("table2", fires())]);
        let cols = scope.expand_star(None).expect("star never ambiguous");
        assert_eq!(cols.len(), 6);
        // both copies retained, colliding names qualified
        assert_eq!(cols[0].alias.as_deref(), Some("table1.temp"));
        assert_eq!(cols[3].alias.as_deref(), Some("table2.temp"));
    }

    #[test]
    fn qualified_star_expands_one_table_without_qualification() {
        let scope = Scope::new(vec![base("f", fires()), base("d", digimon())]);
        let cols = scope.expand_star(Some("f")).expect("qualified star");
        assert_eq!(cols.len(), 3);
        assert!(cols.iter().all(|c| c.table == "f" && c.alias.is_none()));
    }

    #[test]
    fn duplicate_visible_names_do_not_collide() {
        // from a, a
        let scope = Scope::new(vec![base("a", fires()), base("a", fires())]);
        let cols = scope.expand_star(None).expect("no catalog collision");
        assert_eq!(cols.len(), 6);
    }
}
