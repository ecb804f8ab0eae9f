//! Per-criterion narrowing queries.
//!
//! Each query selects the record ids among the current candidates that
//! satisfy one criterion. Content rows are the base rows, so results are
//! grouped by record id.

use datafos_fields::{
    escape_like_pattern, field_adapter, push_id_list, push_int, push_text, BindValue,
    CriterionKey, FieldDefinition, SearchCriterion,
};

/// Outcome of planning one narrowing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrowing {
    /// Run this query; its ids replace the candidate set.
    Query { sql: String, params: Vec<BindValue> },
    /// The criterion can never match.
    Empty,
    /// The criterion constrains nothing; keep the candidates as they are.
    Unconstrained,
}

struct NarrowingBase {
    alias: String,
    params: Vec<BindValue>,
    joins: String,
    form_id: i64,
}

impl NarrowingBase {
    fn new(alias: impl Into<String>, form_id: i64) -> Self {
        Self {
            alias: alias.into(),
            params: Vec::new(),
            joins: String::new(),
            form_id,
        }
    }

    fn finish(mut self, candidates: &[i64], predicate: &str) -> Narrowing {
        let form = push_int(&mut self.params, self.form_id);
        let in_list = push_id_list(&mut self.params, candidates);
        let sql = format!(
            "SELECT {a}.recordid FROM datafos_content {a} \
             INNER JOIN datafos_records r ON r.id = {a}.recordid \
             LEFT JOIN users u ON u.id = r.userid{joins} \
             WHERE r.dataid = ${form} AND {a}.recordid IN {in_list} AND {predicate} \
             GROUP BY {a}.recordid",
            a = self.alias,
            joins = self.joins,
            form = form,
            in_list = in_list,
            predicate = predicate,
        );
        Narrowing::Query {
            sql,
            params: self.params,
        }
    }
}

fn name_predicate(column: &str, value: &str, base: &mut NarrowingBase) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let idx = push_text(&mut base.params, format!("%{}%", escape_like_pattern(value)));
    Some(format!("LOWER({}) LIKE LOWER(${}) ESCAPE '\\'", column, idx))
}

/// Plan the narrowing query for one criterion.
///
/// Criteria naming a field that is not part of `fields` are stale and
/// constrain nothing.
pub fn plan_narrowing(
    form_id: i64,
    key: CriterionKey,
    criterion: &SearchCriterion,
    fields: &[FieldDefinition],
    candidates: &[i64],
) -> Narrowing {
    match (key, criterion) {
        (CriterionKey::Field(field_id), SearchCriterion::Field(value)) => {
            let Some(field) = fields.iter().find(|f| f.id == field_id) else {
                tracing::debug!(field_id, "Ignoring criterion for unknown field");
                return Narrowing::Unconstrained;
            };
            let mut base = NarrowingBase::new(format!("c{}", field_id), form_id);
            let alias = base.alias.clone();
            match field_adapter(field).generate_sql(field, &alias, value, &mut base.params) {
                Some(predicate) => base.finish(candidates, &predicate),
                None => Narrowing::Unconstrained,
            }
        }
        (CriterionKey::TimeModified, SearchCriterion::TimeModified(bound)) => {
            let mut base = NarrowingBase::new("c", form_id);
            let idx = push_int(&mut base.params, *bound);
            base.finish(candidates, &format!("r.timemodified >= ${}", idx))
        }
        (CriterionKey::FirstName, SearchCriterion::FirstName(value)) => {
            let mut base = NarrowingBase::new("c", form_id);
            match name_predicate("u.firstname", value, &mut base) {
                Some(predicate) => base.finish(candidates, &predicate),
                None => Narrowing::Unconstrained,
            }
        }
        (CriterionKey::LastName, SearchCriterion::LastName(value)) => {
            let mut base = NarrowingBase::new("c", form_id);
            match name_predicate("u.lastname", value, &mut base) {
                Some(predicate) => base.finish(candidates, &predicate),
                None => Narrowing::Unconstrained,
            }
        }
        (CriterionKey::Approved, SearchCriterion::Approved(approved)) => {
            let mut base = NarrowingBase::new("c", form_id);
            let idx = push_int(&mut base.params, i64::from(*approved));
            base.finish(candidates, &format!("r.approved = ${}", idx))
        }
        (CriterionKey::Tags, SearchCriterion::Tags(names)) => {
            let names: Vec<String> = names
                .iter()
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect();
            if names.is_empty() {
                return Narrowing::Empty;
            }
            let mut base = NarrowingBase::new("c", form_id);
            let mut predicates = Vec::with_capacity(names.len());
            for (i, name) in names.into_iter().enumerate() {
                base.joins.push_str(&format!(
                    " INNER JOIN tag_instances ti{i} ON ti{i}.itemid = r.id \
                     INNER JOIN tags t{i} ON t{i}.id = ti{i}.tagid",
                    i = i
                ));
                let idx = push_text(&mut base.params, name);
                predicates.push(format!("t{}.name = ${}", i, idx));
            }
            base.finish(candidates, &predicates.join(" AND "))
        }
        (key, _) => {
            tracing::warn!(criterion = key.id(), "Criterion does not match its key, ignoring");
            Narrowing::Unconstrained
        }
    }
}
