/// 断言模块 - 提供 API 响应断言能力
mod evaluator;
mod types;

pub use evaluator::validate;
pub use types::{
    AssertionDetails, AssertionOperator, AssertionResults, BodyAssertion, ResponseAssertions,
};
