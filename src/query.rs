use serde::Serialize;

use crate::models::{Field, PAGE_LIMIT, SortKey, SortOrder};

/// Company and position filters as the user last typed or picked them.
/// Only read when a search is triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    company: String,
    position: String,
}

impl FilterState {
    pub fn new(company: &str, position: &str) -> Self {
        Self {
            company: company.to_string(),
            position: position.to_string(),
        }
    }

    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Company => self.company = value.to_string(),
            Field::Position => self.position = value.to_string(),
        }
    }

    pub fn raw(&self, field: Field) -> &str {
        match field {
            Field::Company => &self.company,
            Field::Position => &self.position,
        }
    }

    /// The trimmed value, or `None` when the filter is blank.
    ///
    /// Surrounding whitespace is never sent, so a whitespace-only filter
    /// counts as unset and does not select a filtered listing.
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = self.raw(field).trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.get(Field::Company).is_none() && self.get(Field::Position).is_none()
    }

    pub fn clear(&mut self) {
        self.company.clear();
        self.position.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn first(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            sort_order: SortOrder::Desc,
            limit: PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One of the four post listings the API exposes, each on its own endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All {
        page: Page,
    },
    ByCompany {
        company: String,
        page: Page,
    },
    ByPosition {
        position: String,
        page: Page,
    },
    ByCompanyAndPosition {
        company: String,
        position: String,
        page: Page,
    },
}

#[derive(Debug, Serialize)]
pub struct QueryBody<'a> {
    #[serde(flatten)]
    page: &'a Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a str>,
}

impl Query {
    pub fn operation(&self) -> &'static str {
        match self {
            Query::All { .. } => "listAll",
            Query::ByCompany { .. } => "listByCompany",
            Query::ByPosition { .. } => "listByPosition",
            Query::ByCompanyAndPosition { .. } => "listByCompanyAndPosition",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Query::All { .. } => "/posts/all",
            Query::ByCompany { .. } => "/posts/company",
            Query::ByPosition { .. } => "/posts/position",
            Query::ByCompanyAndPosition { .. } => "/posts/company-position",
        }
    }

    pub fn page(&self) -> &Page {
        match self {
            Query::All { page }
            | Query::ByCompany { page, .. }
            | Query::ByPosition { page, .. }
            | Query::ByCompanyAndPosition { page, .. } => page,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.page().sort_key
    }

    pub fn body(&self) -> QueryBody<'_> {
        let (company, position) = match self {
            Query::All { .. } => (None, None),
            Query::ByCompany { company, .. } => (Some(company.as_str()), None),
            Query::ByPosition { position, .. } => (None, Some(position.as_str())),
            Query::ByCompanyAndPosition { company, position, .. } => {
                (Some(company.as_str()), Some(position.as_str()))
            }
        };
        QueryBody {
            page: self.page(),
            company,
            position,
        }
    }
}

pub struct QueryComposer;

impl QueryComposer {
    /// Picks the listing for whichever filters are set.
    pub fn build(filter: &FilterState, sort_key: SortKey) -> Query {
        let page = Page::first(sort_key);
        match (filter.get(Field::Company), filter.get(Field::Position)) {
            (None, None) => Query::All { page },
            (Some(company), None) => Query::ByCompany {
                company: company.to_string(),
                page,
            },
            (None, Some(position)) => Query::ByPosition {
                position: position.to_string(),
                page,
            },
            (Some(company), Some(position)) => Query::ByCompanyAndPosition {
                company: company.to_string(),
                position: position.to_string(),
                page,
            },
        }
    }

    pub fn unfiltered(sort_key: SortKey) -> Query {
        Query::All {
            page: Page::first(sort_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_only_selects_list_by_company() {
        let filter = FilterState::new("Acme", "");
        let query = QueryComposer::build(&filter, SortKey::Views);

        assert_eq!(query.operation(), "listByCompany");
        assert_eq!(
            serde_json::to_value(query.body()).unwrap(),
            json!({
                "company": "Acme",
                "sortKey": "views",
                "sortOrder": "desc",
                "limit": 25,
                "offset": 0
            })
        );
    }

    #[test]
    fn test_branch_table_is_total_and_exclusive() {
        let cases = [
            ("", "", "listAll", "/posts/all"),
            ("Acme", "", "listByCompany", "/posts/company"),
            ("", "Engineer", "listByPosition", "/posts/position"),
            ("Acme", "Engineer", "listByCompanyAndPosition", "/posts/company-position"),
        ];
        for (company, position, operation, endpoint) in cases {
            let query = QueryComposer::build(&FilterState::new(company, position), SortKey::CreateDate);
            assert_eq!(query.operation(), operation, "filter ({company:?}, {position:?})");
            assert_eq!(query.endpoint(), endpoint);
            assert_eq!(*query.page(), Page::first(SortKey::CreateDate));
        }
    }

    #[test]
    fn test_empty_filter_matches_unfiltered_listing() {
        let query = QueryComposer::build(&FilterState::default(), SortKey::InterviewDate);
        assert_eq!(query, QueryComposer::unfiltered(SortKey::InterviewDate));
        assert_eq!(
            serde_json::to_value(query.body()).unwrap(),
            json!({"sortKey": "interview_date", "sortOrder": "desc", "limit": 25, "offset": 0})
        );
    }

    #[test]
    fn test_blank_values_count_as_unset_and_are_trimmed() {
        let filter = FilterState::new("   ", "  Manager ");
        assert_eq!(
            QueryComposer::build(&filter, SortKey::Views),
            Query::ByPosition {
                position: "Manager".to_string(),
                page: Page::first(SortKey::Views),
            }
        );

        let mut filter = FilterState::new("Acme", "Manager");
        assert!(!filter.is_empty());
        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_both_filters_in_body() {
        let mut filter = FilterState::default();
        filter.set(Field::Company, "Acme");
        filter.set(Field::Position, "Engineer");
        assert_eq!(filter.raw(Field::Company), "Acme");

        let query = QueryComposer::build(&filter, SortKey::CreateDate);
        let body = serde_json::to_value(query.body()).unwrap();
        assert_eq!(body["company"], "Acme");
        assert_eq!(body["position"], "Engineer");
        assert_eq!(query.sort_key(), SortKey::CreateDate);
    }
}
