use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A GraphQL operation as sent over the wire.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Response<D> {
    pub(crate) data: Option<D>,
    #[serde(default)]
    pub(crate) errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseError {
    pub(crate) message: String,
}

pub(crate) fn join_messages(errors: &[ResponseError]) -> String {
    if errors.is_empty() {
        return "no errors reported".to_string();
    }

    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) const TRANSACTIONS: &str = r#"
query GetTransactionsList($offset: Int, $limit: Int, $filters: TransactionFilterInput, $orderBy: TransactionOrdering) {
    allTransactions(filters: $filters) {
        totalCount
        results(offset: $offset, limit: $limit, orderBy: $orderBy) {
            id
            ...TransactionsListFields
            __typename
        }
        __typename
    }
}
fragment TransactionsListFields on Transaction {
    id
    amount
    pending
    date
    hideFromReports
    plaidName
    notes
    isRecurring
    reviewStatus
    attachments {
        id
        __typename
    }
    isSplitTransaction
    category {
        id
        name
        icon
        __typename
    }
    merchant {
        name
        id
        transactionsCount
        __typename
    }
    tags {
        id
        name
        color
        order
        __typename
    }
    __typename
}
"#;

pub(crate) const TAGS: &str = r#"
query GetHouseholdTransactionTags($search: String, $limit: Int, $bulkParams: BulkTransactionDataParams) {
    householdTransactionTags(search: $search, limit: $limit, bulkParams: $bulkParams) {
        id
        name
        color
        order
        transactionCount
        __typename
    }
}
"#;

pub(crate) const SET_TRANSACTION_TAGS: &str = r#"
mutation Web_SetTransactionTags($input: SetTransactionTagsInput!) {
    setTransactionTags(input: $input) {
        errors {
            message
            __typename
        }
        transaction {
            id
            tags {
                id
                __typename
            }
            __typename
        }
        __typename
    }
}
"#;

pub(crate) const UPDATE_TRANSACTION: &str = r#"
mutation Web_UpdateTransactionOverview($input: UpdateTransactionMutationInput!) {
    updateTransaction(input: $input) {
        transaction {
            id
            hideFromReports
            __typename
        }
        errors {
            message
            __typename
        }
        __typename
    }
}
"#;
