use crate::{
    data::PageRequest,
    error::{MakeQuerySnafu, RollbookResult},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Student {
    pub student_id: i32,
    pub name: String,
    pub address: String,
}

///The create/update payload - the id always comes from storage or the URL.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentDetails {
    pub name: String,
    pub address: String,
}

///What the list operations match rows against.
///
///The canonical filter is a single keyword checked against name and address,
///but per-column filters are also accepted and get OR-combined the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchFilter {
    #[default]
    None,
    Keyword(String),
    Fields {
        name: Option<String>,
        address: Option<String>,
    },
}

impl SearchFilter {
    ///A non-empty `keyword` wins over per-column params; empty strings count as absent.
    pub fn from_params(
        keyword: Option<String>,
        name: Option<String>,
        address: Option<String>,
    ) -> Self {
        let non_empty = |param: Option<String>| param.filter(|value| !value.is_empty());

        if let Some(keyword) = non_empty(keyword) {
            return Self::Keyword(keyword);
        }

        match (non_empty(name), non_empty(address)) {
            (None, None) => Self::None,
            (name, address) => Self::Fields { name, address },
        }
    }

    fn push_where_clause(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::None => {}
            Self::Keyword(keyword) => {
                let pattern = like_pattern(keyword);
                query
                    .push(" WHERE name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR address ILIKE ")
                    .push_bind(pattern);
            }
            Self::Fields { name, address } => {
                query.push(" WHERE ");
                if let Some(name) = name {
                    query.push("name ILIKE ").push_bind(like_pattern(name));
                    if address.is_some() {
                        query.push(" OR ");
                    }
                }
                if let Some(address) = address {
                    query
                        .push("address ILIKE ")
                        .push_bind(like_pattern(address));
                }
            }
        }
    }
}

///Substring match pattern, with LIKE metacharacters in the user's term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl Student {
    pub async fn get_from_db_by_id(
        id: i32,
        conn: &mut PgConnection,
    ) -> RollbookResult<Option<Self>> {
        sqlx::query_as("SELECT student_id, name, address FROM students WHERE student_id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    ///Fetches one page of matching rows, always ordered by id so pagination stays stable.
    pub async fn get_page(
        filter: &SearchFilter,
        page: PageRequest,
        conn: &mut PgConnection,
    ) -> RollbookResult<Vec<Self>> {
        let mut query = QueryBuilder::new("SELECT student_id, name, address FROM students");
        filter.push_where_clause(&mut query);
        query
            .push(" ORDER BY student_id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        query
            .build_query_as()
            .fetch_all(conn)
            .await
            .context(MakeQuerySnafu)
    }

    pub async fn count_matching(
        filter: &SearchFilter,
        conn: &mut PgConnection,
    ) -> RollbookResult<i64> {
        let mut query = QueryBuilder::new("SELECT count(student_id) FROM students");
        filter.push_where_clause(&mut query);

        let (total,): (i64,) = query
            .build_query_as()
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(total)
    }

    pub async fn insert_into_database(
        details: StudentDetails,
        conn: &mut PgConnection,
    ) -> RollbookResult<i32> {
        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO students (name, address) VALUES ($1, $2) RETURNING student_id")
                .bind(&details.name)
                .bind(&details.address)
                .fetch_one(conn)
                .await
                .context(MakeQuerySnafu)?;
        Ok(id)
    }

    ///Returns whether a row actually matched - zero affected rows means the id is unknown.
    pub async fn update_in_database(
        id: i32,
        details: StudentDetails,
        conn: &mut PgConnection,
    ) -> RollbookResult<bool> {
        let result = sqlx::query("UPDATE students SET name = $1, address = $2 WHERE student_id = $3")
            .bind(&details.name)
            .bind(&details.address)
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_from_database(id: i32, conn: &mut PgConnection) -> RollbookResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_wins_over_field_params() {
        assert_eq!(
            SearchFilter::from_params(
                Some("smith".to_string()),
                Some("ada".to_string()),
                Some("loop".to_string())
            ),
            SearchFilter::Keyword("smith".to_string())
        );
    }

    #[test]
    fn empty_params_mean_no_filter() {
        assert_eq!(
            SearchFilter::from_params(Some(String::new()), None, Some(String::new())),
            SearchFilter::None
        );
    }

    #[test]
    fn field_params_survive_without_a_keyword() {
        assert_eq!(
            SearchFilter::from_params(None, Some("ada".to_string()), None),
            SearchFilter::Fields {
                name: Some("ada".to_string()),
                address: None
            }
        );
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("smith"), "%smith%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    fn page_sql(filter: &SearchFilter) -> String {
        let mut query = QueryBuilder::<Postgres>::new("SELECT student_id, name, address FROM students");
        filter.push_where_clause(&mut query);
        query
            .push(" ORDER BY student_id LIMIT ")
            .push_bind(5_i64)
            .push(" OFFSET ")
            .push_bind(0_i64);
        query.sql().to_string()
    }

    #[test]
    fn unfiltered_page_query_has_no_where_clause() {
        assert_eq!(
            page_sql(&SearchFilter::None),
            "SELECT student_id, name, address FROM students ORDER BY student_id LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn keyword_filter_checks_both_columns() {
        assert_eq!(
            page_sql(&SearchFilter::Keyword("smith".to_string())),
            "SELECT student_id, name, address FROM students \
             WHERE name ILIKE $1 OR address ILIKE $2 \
             ORDER BY student_id LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn field_filters_are_or_combined() {
        assert_eq!(
            page_sql(&SearchFilter::Fields {
                name: Some("ada".to_string()),
                address: Some("loop".to_string())
            }),
            "SELECT student_id, name, address FROM students \
             WHERE name ILIKE $1 OR address ILIKE $2 \
             ORDER BY student_id LIMIT $3 OFFSET $4"
        );

        assert_eq!(
            page_sql(&SearchFilter::Fields {
                name: None,
                address: Some("loop".to_string())
            }),
            "SELECT student_id, name, address FROM students \
             WHERE address ILIKE $1 \
             ORDER BY student_id LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn count_query_matches_the_filter() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT count(student_id) FROM students");
        SearchFilter::Keyword("smith".to_string()).push_where_clause(&mut query);
        assert_eq!(
            query.sql(),
            "SELECT count(student_id) FROM students WHERE name ILIKE $1 OR address ILIKE $2"
        );
    }
}
