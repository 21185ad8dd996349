use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use url::Url;

use crate::auth::Token;
use crate::model::{Tag, Transaction};
use crate::pagination::{paginate, Page};
use crate::query::{self, join_messages, Request, Response};
use crate::transport::{HttpTransport, Transport};
use crate::{Error, Result};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOrdering {
    #[default]
    Date,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionFilters {
    pub search: String,
    pub categories: Vec<String>,
    pub accounts: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    pub page_size: usize,
    pub order_by: TransactionOrdering,
    pub filters: TransactionFilters,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            order_by: TransactionOrdering::default(),
            filters: TransactionFilters::default(),
        }
    }
}

impl TransactionQuery {
    fn request(&self, page: Page) -> Request {
        Request {
            operation_name: "GetTransactionsList",
            query: query::TRANSACTIONS,
            variables: json!({
                "offset": page.offset,
                "limit": page.limit,
                "orderBy": self.order_by,
                "filters": self.filters,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagQuery {
    /// Case-insensitive substring matched against tag names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsData {
    all_transactions: TransactionList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionList {
    total_count: Option<u64>,
    results: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagsData {
    household_transaction_tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetTagsData {
    set_transaction_tags: Payload<TaggedTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTransactionData {
    update_transaction: Payload<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TaggedTransaction {
    tags: Vec<TagRef>,
}

#[derive(Debug, Deserialize)]
struct TagRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Payload<T> {
    transaction: Option<T>,
    #[serde(default)]
    errors: Option<PayloadErrors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadErrors {
    One(PayloadError),
    Many(Vec<PayloadError>),
}

#[derive(Debug, Deserialize)]
struct PayloadError {
    message: Option<String>,
}

impl<T> Payload<T> {
    fn into_result(self, operation: &'static str) -> Result<Option<T>> {
        let errors = match self.errors {
            Some(PayloadErrors::One(e)) => vec![e],
            Some(PayloadErrors::Many(e)) => e,
            None => vec![],
        };
        let messages: Vec<String> = errors
            .into_iter()
            .filter_map(|e| e.message)
            .filter(|m| !m.is_empty())
            .collect();

        if !messages.is_empty() {
            return Err(Error::Mutation(operation, messages.join("; ")));
        }

        Ok(self.transaction)
    }
}

pub struct Client<T = HttpTransport> {
    transport: T,
}

impl Client<HttpTransport> {
    /// Builds a client against the hosted API.
    pub fn from_token(token: Token) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(token)?))
    }

    pub fn with_base(base: &Url, token: Token) -> Result<Self> {
        Ok(Self::new(HttpTransport::with_base(base, token)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn run<D: DeserializeOwned>(&self, request: Request) -> Result<D> {
        let raw = self.transport.execute(&request).await?;
        let res: Response<D> = serde_json::from_value(raw)?;

        match res.data {
            Some(data) => Ok(data),
            None => Err(Error::EmptyResponse(
                request.operation_name,
                join_messages(&res.errors),
            )),
        }
    }

    /// Fetches a single page of transactions.
    #[tracing::instrument(skip(self, query))]
    pub async fn transactions_page(
        &self,
        query: &TransactionQuery,
        page: Page,
    ) -> Result<Vec<Transaction>> {
        let data: TransactionsData = self.run(query.request(page)).await?;
        tracing::trace!(total = ?data.all_transactions.total_count);

        Ok(data.all_transactions.results)
    }

    /// Streams every transaction matching `query`, one page at a time.
    pub fn transactions(
        &self,
        query: TransactionQuery,
    ) -> impl Stream<Item = Result<Transaction>> + '_ {
        paginate(query.page_size, move |page| {
            let request = query.request(page);
            async move {
                let data: TransactionsData = self.run(request).await?;
                Ok::<_, Error>(data.all_transactions.results)
            }
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn tags(&self, query: &TagQuery) -> Result<Vec<Tag>> {
        let data: TagsData = self
            .run(Request {
                operation_name: "GetHouseholdTransactionTags",
                query: query::TAGS,
                variables: serde_json::to_value(query)?,
            })
            .await?;

        Ok(data.household_transaction_tags)
    }

    /// Replaces the full tag set of a transaction. An empty `tag_ids` clears
    /// every tag. Returns the tag ids the service reports afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn set_transaction_tags(
        &self,
        transaction_id: &str,
        tag_ids: &[String],
    ) -> Result<Vec<String>> {
        let data: SetTagsData = self
            .run(Request {
                operation_name: "Web_SetTransactionTags",
                query: query::SET_TRANSACTION_TAGS,
                variables: json!({
                    "input": {
                        "transactionId": transaction_id,
                        "tagIds": tag_ids,
                    }
                }),
            })
            .await?;

        let tags = data
            .set_transaction_tags
            .into_result("setTransactionTags")?
            .map(|txn| txn.tags.into_iter().map(|t| t.id).collect())
            .unwrap_or_default();

        info!("Set {} tag(s) on transaction {}.", tag_ids.len(), transaction_id);
        Ok(tags)
    }

    /// Marks a transaction as hidden from reports.
    #[tracing::instrument(skip(self))]
    pub async fn hide_transaction(&self, transaction_id: &str) -> Result<()> {
        let data: UpdateTransactionData = self
            .run(Request {
                operation_name: "Web_UpdateTransactionOverview",
                query: query::UPDATE_TRANSACTION,
                variables: json!({
                    "input": {
                        "id": transaction_id,
                        "hideFromReports": true,
                    }
                }),
            })
            .await?;

        data.update_transaction.into_result("updateTransaction")?;

        info!("Hid transaction {}.", transaction_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        responses: Mutex<VecDeque<Value>>,
        requests: Mutex<Vec<Request>>,
    }

    impl Recorder {
        fn replying(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Default::default(),
            }
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn execute(&self, request: &Request) -> Result<Value> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no response queued"))
        }
    }

    #[tokio::test]
    async fn lists_tags_with_search() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {
                "householdTransactionTags": [
                    {"id": "1", "name": "Reimbursable", "color": "#FF7369", "order": 0, "transactionCount": 12, "__typename": "TransactionTag"},
                ]
            }
        })]));

        let tags = client
            .tags(&TagQuery {
                search: Some("reim".into()),
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].transaction_count, Some(12));

        let sent = client.transport().requests();
        assert_eq!(sent[0].operation_name, "GetHouseholdTransactionTags");
        assert_eq!(sent[0].variables, json!({"search": "reim"}));
    }

    #[tokio::test]
    async fn empty_tag_list_clears_tags() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {
                "setTransactionTags": {
                    "errors": null,
                    "transaction": {"id": "42", "tags": []}
                }
            }
        })]));

        let tags = client.set_transaction_tags("42", &[]).await.unwrap();

        assert!(tags.is_empty());
        let sent = client.transport().requests();
        assert_eq!(
            sent[0].variables,
            json!({"input": {"transactionId": "42", "tagIds": []}})
        );
    }

    #[tokio::test]
    async fn set_tags_replaces_whole_set() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {
                "setTransactionTags": {
                    "errors": null,
                    "transaction": {"id": "42", "tags": [{"id": "7"}, {"id": "9"}]}
                }
            }
        })]));

        let ids = vec!["7".to_string(), "9".to_string()];
        let tags = client.set_transaction_tags("42", &ids).await.unwrap();

        assert_eq!(tags, ids);
        assert_eq!(
            client.transport().requests()[0].variables["input"]["tagIds"],
            json!(["7", "9"])
        );
    }

    #[tokio::test]
    async fn hide_sets_hide_from_reports() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {
                "updateTransaction": {
                    "transaction": {"id": "42", "hideFromReports": true},
                    "errors": null
                }
            }
        })]));

        client.hide_transaction("42").await.unwrap();

        let sent = client.transport().requests();
        assert_eq!(sent[0].operation_name, "Web_UpdateTransactionOverview");
        assert_eq!(
            sent[0].variables,
            json!({"input": {"id": "42", "hideFromReports": true}})
        );
    }

    #[tokio::test]
    async fn mutation_payload_errors_are_returned() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {
                "updateTransaction": {
                    "transaction": null,
                    "errors": {"message": "Transaction not found"}
                }
            }
        })]));

        let err = client.hide_transaction("missing").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "updateTransaction failed: Transaction not found"
        );
    }

    #[tokio::test]
    async fn response_without_data_is_an_error() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": null,
            "errors": [{"message": "Unauthorized"}]
        })]));

        let err = client.tags(&TagQuery::default()).await.unwrap_err();

        assert!(matches!(err, Error::EmptyResponse("GetHouseholdTransactionTags", _)));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn transaction_page_variables() {
        let client = Client::new(Recorder::replying(vec![json!({
            "data": {"allTransactions": {"totalCount": 0, "results": []}}
        })]));
        let query = TransactionQuery {
            page_size: 25,
            ..TransactionQuery::default()
        };

        let page = client
            .transactions_page(&query, Page { offset: 50, limit: 25 })
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(
            client.transport().requests()[0].variables,
            json!({
                "offset": 50,
                "limit": 25,
                "orderBy": "date",
                "filters": {"search": "", "categories": [], "accounts": [], "tags": []},
            })
        );
    }
}
