use serde_json::Value;

use crate::client::EndpointResponse;
use crate::model::CallStatus;

/// Status and predicted label for one response.
///
/// Non-2xx responses carry no prediction. For 2xx the prediction is
/// `comparison_field` of the top-level body object, absent when the field is
/// missing or the body is not an object.
pub(crate) fn read_prediction(
    response: &EndpointResponse,
    comparison_field: &str,
) -> (CallStatus, Option<Value>) {
    let status = CallStatus::from_http(response.status);
    if !status.is_success() {
        return (status, None);
    }
    let predicted = response
        .body
        .as_ref()
        .and_then(|body| body.get(comparison_field))
        .cloned();
    (status, predicted)
}
