//! Build statements from CLI options and render them

use super::{json_to_values, parse_assignment, parse_filter, CliError};
use crate::{delete, insert, select, update, Expr, Options, Statement, Value};
use tracing::debug;

/// Statement kind selected by the subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Select,
    Create,
    Update,
    Delete,
}

/// Options for the render commands
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub kind: StatementKind,
    /// Entity type, or `Entity.field` for selects
    pub entity: String,
    /// `key<op>value` filters, joined with `and`
    pub filters: Vec<String>,
    /// Attributes to populate (select only)
    pub populate: Vec<String>,
    /// Attributes to group by (select only)
    pub group_by: Vec<String>,
    /// Sort specs such as `name descending`
    pub sort: Vec<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// `key=value` assignments (create and update)
    pub set: Vec<String>,
    /// JSON object of field values (create and update)
    pub values: Option<String>,
    pub page_size: Option<u32>,
    /// Delete only
    pub remove_components: bool,
}

impl RenderOptions {
    fn filter_exprs(&self) -> Result<Vec<Expr>, CliError> {
        Ok(self
            .filters
            .iter()
            .map(String::as_str)
            .map(parse_filter)
            .collect::<crate::Result<Vec<_>>>()?)
    }

    fn field_values(&self) -> Result<Vec<(String, Value)>, CliError> {
        let mut values = match &self.values {
            Some(json) => json_to_values(json)?,
            None => Vec::new(),
        };
        for arg in &self.set {
            values.push(parse_assignment(arg)?);
        }
        Ok(values)
    }

    fn options(&self) -> Options {
        let options = Options::new().remove_components(self.remove_components);
        match self.page_size {
            Some(page_size) => options.page_size(page_size),
            None => options,
        }
    }
}

macro_rules! apply_clauses {
    ($stmt:expr, $options:expr) => {{
        let mut stmt = $stmt.where_($options.filter_exprs()?)?;
        for key in &$options.sort {
            stmt = stmt.sort(key)?;
        }
        if let Some(offset) = $options.offset {
            stmt = stmt.offset(offset);
        }
        if let Some(limit) = $options.limit {
            stmt = stmt.limit(limit);
        }
        stmt.options($options.options())
    }};
}

/// Build the statement the options describe.
pub fn build_statement(options: &RenderOptions) -> Result<Statement<'static>, CliError> {
    let stmt: Statement<'static> = match options.kind {
        StatementKind::Select => {
            let stmt = select(&options.entity)
                .populate(options.populate.iter().map(String::as_str))
                .group_by(options.group_by.iter().map(String::as_str));
            apply_clauses!(stmt, options).into()
        }
        StatementKind::Create => insert(&options.entity).values(options.field_values()?).into(),
        StatementKind::Update => {
            apply_clauses!(update(&options.entity), options)
                .values(options.field_values()?)
                .into()
        }
        StatementKind::Delete => apply_clauses!(delete(&options.entity), options).into(),
    };
    debug!(statement = ?stmt, "built");
    Ok(stmt)
}

/// Render the statement the options describe.
pub fn execute_render(options: &RenderOptions) -> Result<String, CliError> {
    Ok(build_statement(options)?.to_string())
}
