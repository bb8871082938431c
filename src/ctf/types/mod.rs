//! Types for Conditional Tokens contract calls.

mod request;
mod response;

pub use request::{
    CollectionIdRequest, ConditionIdRequest, MergePositionsRequest, PositionIdRequest,
    PrepareConditionRequest, RedeemPositionsRequest, ReportPayoutsRequest, SplitPositionRequest,
};
pub use response::{
    CollectionIdResponse, ConditionIdResponse, PayoutsResponse, PositionIdResponse,
    TransactionResponse,
};
