//! Query scopes: the value holder, filters and query parameters of one operation

use std::fmt;
use std::marker::PhantomData;

use crate::context::Context;
use crate::model::{Model, ModelStruct};

/// Filter operators understood by neuron servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    NotNull,
}

impl Operator {
    /// Raw query representation, e.g. `$eq`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "$eq",
            Operator::NotEqual => "$ne",
            Operator::GreaterThan => "$gt",
            Operator::GreaterEqual => "$ge",
            Operator::LessThan => "$lt",
            Operator::LessEqual => "$le",
            Operator::In => "$in",
            Operator::NotIn => "$notin",
            Operator::Contains => "$contains",
            Operator::StartsWith => "$startswith",
            Operator::EndsWith => "$endswith",
            Operator::IsNull => "$isnull",
            Operator::NotNull => "$notnull",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operator with its values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorValues {
    pub operator: Operator,
    pub values: Vec<String>,
}

/// A filter on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    values: Vec<OperatorValues>,
}

impl Filter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            values: Vec::new(),
        }
    }

    /// Add an operator with its values
    pub fn with<I, S>(mut self, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.push(OperatorValues {
            operator,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn values(&self) -> &[OperatorValues] {
        &self.values
    }

    /// Query pairs for this filter, one per operator, in insertion order
    ///
    /// Keys follow `filter[{collection}][{field}][{operator}]`; values are
    /// comma-joined.
    pub fn format_query(&self, collection: &str) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|ov| {
                (
                    format!("filter[{}][{}][{}]", collection, self.field, ov.operator),
                    ov.values.join(","),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Ascending => write!(f, "{}", self.field),
            SortOrder::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// Limit/offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

/// Value holder of a scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScopeValue<M> {
    #[default]
    Empty,
    One(M),
    Many(Vec<M>),
}

impl<M> ScopeValue<M> {
    pub fn is_empty(&self) -> bool {
        matches!(self, ScopeValue::Empty)
    }

    pub fn as_one(&self) -> Option<&M> {
        match self {
            ScopeValue::One(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[M]> {
        match self {
            ScopeValue::Many(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_one(self) -> Option<M> {
        match self {
            ScopeValue::One(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_many(self) -> Option<Vec<M>> {
        match self {
            ScopeValue::Many(v) => Some(v),
            _ => None,
        }
    }
}

/// The target, filters and context of a single repository operation
#[derive(Debug, Clone)]
pub struct Scope<M: Model> {
    /// Value sent to the server and/or populated from its response
    pub value: ScopeValue<M>,
    primary_filters: Vec<Filter>,
    filters: Vec<Filter>,
    sort: Vec<SortField>,
    pagination: Option<Pagination>,
    fieldset: Vec<String>,
    context: Context,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Default for Scope<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Scope<M> {
    pub fn new() -> Self {
        Self {
            value: ScopeValue::Empty,
            primary_filters: Vec::new(),
            filters: Vec::new(),
            sort: Vec::new(),
            pagination: None,
            fieldset: Vec::new(),
            context: Context::background(),
            _model: PhantomData,
        }
    }

    /// Scope holding a single value
    pub fn with_value(value: M) -> Self {
        let mut scope = Self::new();
        scope.value = ScopeValue::One(value);
        scope
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Filter on the primary field; merged into the first primary filter
    pub fn filter_primary<I, S>(mut self, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.primary_filters.pop() {
            Some(existing) => self.primary_filters.push(existing.with(operator, values)),
            None => self
                .primary_filters
                .push(Filter::new(M::PRIMARY_FIELD).with(operator, values)),
        }
        self
    }

    /// Filter on an attribute field
    pub fn filter<I, S>(mut self, field: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::new(field).with(operator, values));
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            order,
        });
        self
    }

    pub fn paginate(mut self, limit: u64, offset: u64) -> Self {
        self.pagination = Some(Pagination { limit, offset });
        self
    }

    /// Restrict the returned attributes (sparse fieldset)
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fieldset.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn primary_filters(&self) -> &[Filter] {
        &self.primary_filters
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn model_struct(&self) -> ModelStruct {
        M::model_struct()
    }

    /// Query pairs for every filter, sort, page and fieldset of this scope
    pub fn format_query(&self) -> Vec<(String, String)> {
        let collection = M::COLLECTION;
        let mut query: Vec<(String, String)> = self
            .primary_filters
            .iter()
            .chain(self.filters.iter())
            .flat_map(|f| f.format_query(collection))
            .collect();

        if !self.sort.is_empty() {
            let sort: Vec<String> = self.sort.iter().map(ToString::to_string).collect();
            query.push(("sort".to_string(), sort.join(",")));
        }

        if let Some(page) = self.pagination {
            query.push(("page[limit]".to_string(), page.limit.to_string()));
            query.push(("page[offset]".to_string(), page.offset.to_string()));
        }

        if !self.fieldset.is_empty() {
            query.push((format!("fields[{}]", collection), self.fieldset.join(",")));
        }

        query
    }
}
