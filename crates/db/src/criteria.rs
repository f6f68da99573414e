//! Criteria query builder for content listings.
//!
//! Items are joined left to right. As in SQL, `AND` binds tighter than `OR`,
//! so `a AND b OR c` selects rows matching `(a AND b) OR c`.

use sea_orm::sea_query::{Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
    Value,
};

use crate::entities::{ContentType, content, taglink};

/// How an item joins the items before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    And,
    Or,
}

/// A single filter on a content column.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaItem(SimpleExpr);

impl CriteriaItem {
    pub fn eq(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.eq(value))
    }

    pub fn ne(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.ne(value))
    }

    pub fn lt(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.lt(value))
    }

    pub fn lte(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.lte(value))
    }

    pub fn gt(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.gt(value))
    }

    pub fn gte(column: content::Column, value: impl Into<Value>) -> Self {
        Self(column.gte(value))
    }

    pub fn like(column: content::Column, pattern: &str) -> Self {
        Self(column.like(pattern))
    }

    /// Restrict to one content type.
    #[must_use]
    pub fn of_type(content_type: ContentType) -> Self {
        Self::eq(content::Column::ContentType, content_type.as_str())
    }

    /// Exclude one content type.
    #[must_use]
    pub fn not_type(content_type: ContentType) -> Self {
        Self::ne(content::Column::ContentType, content_type.as_str())
    }

    /// Only rows with the online flag set.
    #[must_use]
    pub fn online() -> Self {
        Self::eq(content::Column::Online, true)
    }

    fn into_expr(self) -> SimpleExpr {
        self.0
    }
}

/// Filtering, ordering and paging for content queries.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    items: Vec<(Join, CriteriaItem)>,
    order: Option<(content::Column, Order)>,
    secondary_order: Option<(content::Column, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    tags: Vec<i32>,
}

impl Criteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item joined with `AND`.
    #[must_use]
    pub fn add(mut self, item: CriteriaItem) -> Self {
        self.items.push((Join::And, item));
        self
    }

    /// Add an item joined with `OR`.
    #[must_use]
    pub fn or(mut self, item: CriteriaItem) -> Self {
        self.items.push((Join::Or, item));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: content::Column, order: Order) -> Self {
        self.order = Some((column, order));
        self
    }

    #[must_use]
    pub fn then_order_by(mut self, column: content::Column, order: Order) -> Self {
        self.secondary_order = Some((column, order));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Only rows tagged with at least one of `tags`.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = i32>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// The WHERE clause described by the items and tag filter.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut root = Condition::all();

        if !self.items.is_empty() {
            let mut any = Condition::any();
            let mut group = Condition::all();
            for (i, (join, item)) in self.items.iter().enumerate() {
                if i > 0 && *join == Join::Or {
                    any = any.add(group);
                    group = Condition::all();
                }
                group = group.add(item.clone().into_expr());
            }
            root = root.add(any.add(group));
        }

        if !self.tags.is_empty() {
            root = root.add(
                content::Column::Id.in_subquery(
                    Query::select()
                        .column(taglink::Column::ContentId)
                        .from(taglink::Entity)
                        .and_where(taglink::Column::TagId.is_in(self.tags.clone()))
                        .to_owned(),
                ),
            );
        }

        root
    }

    /// Apply the filter only, for counting.
    #[must_use]
    pub fn filter(&self, select: Select<content::Entity>) -> Select<content::Entity> {
        select.filter(self.condition())
    }

    /// Apply filter, ordering and paging. Without an explicit order, rows
    /// come newest first by date, then by submission time.
    #[must_use]
    pub fn apply(&self, select: Select<content::Entity>) -> Select<content::Entity> {
        let mut select = self.filter(select);

        match &self.order {
            Some((column, order)) => {
                select = select.order_by(*column, order.clone());
                if let Some((secondary, order)) = &self.secondary_order {
                    select = select.order_by(*secondary, order.clone());
                }
            }
            None => {
                select = select
                    .order_by_desc(content::Column::Date)
                    .order_by_desc(content::Column::SubmissionTime);
            }
        }

        if let Some(offset) = self.offset {
            select = select.offset(offset);
        }
        if let Some(limit) = self.limit {
            select = select.limit(limit);
        }
        select
    }
}

/// Shortcut for `Select` on the content entity.
#[must_use]
pub fn select_content(criteria: &Criteria) -> Select<content::Entity> {
    criteria.apply(content::Entity::find())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(criteria: &Criteria) -> String {
        select_content(criteria).build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn test_empty_criteria_orders_by_date() {
        let sql = sql(&Criteria::new());
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains(r#"ORDER BY "content"."date" DESC, "content"."submission_time" DESC"#));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let criteria = Criteria::new()
            .add(CriteriaItem::of_type(ContentType::Article))
            .add(CriteriaItem::online())
            .or(CriteriaItem::of_type(ContentType::Static));
        let sql = sql(&criteria);
        assert!(sql.contains(r#"("content"."type" = 'Article' AND"#), "{sql}");
        assert!(sql.contains(r#") OR "content"."type" = 'Static'"#), "{sql}");
    }

    #[test]
    fn test_tag_filter_uses_subquery() {
        let criteria = Criteria::new().tags([3, 7]);
        let sql = sql(&criteria);
        assert!(sql.contains(r#""content"."id" IN (SELECT"#), "{sql}");
        assert!(sql.contains(r#"FROM "taglink""#), "{sql}");
        assert!(sql.contains(r#""tag_id" IN (3, 7)"#), "{sql}");
    }

    #[test]
    fn test_limit_and_offset() {
        let criteria = Criteria::new()
            .order_by(content::Column::Title, Order::Asc)
            .limit(10)
            .offset(20);
        let sql = sql(&criteria);
        assert!(sql.contains(r#"ORDER BY "content"."title" ASC"#));
        assert!(sql.contains("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn test_comparison_and_like_items() {
        let criteria = Criteria::new()
            .add(CriteriaItem::gte(content::Column::Counter, 5))
            .add(CriteriaItem::lt(content::Column::FileSize, 1024))
            .add(CriteriaItem::like(content::Column::Title, "Intro%"))
            .or(CriteriaItem::gt(content::Column::Parent, 0))
            .add(CriteriaItem::lte(content::Column::Rights, 2));
        let sql = sql(&criteria);
        assert!(sql.contains(r#""content"."counter" >= 5"#), "{sql}");
        assert!(sql.contains(r#""content"."file_size" < 1024"#), "{sql}");
        assert!(sql.contains(r#""content"."title" LIKE 'Intro%'"#), "{sql}");
        assert!(sql.contains(r#""content"."parent" > 0"#), "{sql}");
        assert!(sql.contains(r#""content"."rights" <= 2"#), "{sql}");
    }

    #[test]
    fn test_secondary_order() {
        let criteria = Criteria::new()
            .order_by(content::Column::ContentType, Order::Asc)
            .then_order_by(content::Column::Title, Order::Desc);
        let sql = sql(&criteria);
        assert!(
            sql.contains(r#"ORDER BY "content"."type" ASC, "content"."title" DESC"#),
            "{sql}"
        );
    }
}
