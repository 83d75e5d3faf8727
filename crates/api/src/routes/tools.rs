//! Calculator endpoints.
//!
//! Pure computation: nothing is stored and no event is recorded.

use axum::Json;
use domain::calculators::{cpp, loan, resp, savings, tax, ToolKind};
use serde::Serialize;

use crate::extractors::ValidJson;

#[derive(Debug, Serialize)]
pub struct ToolResponse<T> {
    pub ok: bool,
    pub tool: ToolKind,
    pub result: T,
}

fn respond<T>(tool: ToolKind, result: T) -> Json<ToolResponse<T>> {
    Json(ToolResponse {
        ok: true,
        tool,
        result,
    })
}

/// POST /api/tools/loan
pub async fn loan(
    ValidJson(input): ValidJson<loan::LoanInput>,
) -> Json<ToolResponse<loan::LoanResult>> {
    respond(ToolKind::Loan, loan::calculate(&input))
}

/// POST /api/tools/savings
pub async fn savings(
    ValidJson(input): ValidJson<savings::SavingsInput>,
) -> Json<ToolResponse<savings::SavingsResult>> {
    respond(ToolKind::Savings, savings::calculate(&input))
}

/// POST /api/tools/tax
pub async fn tax(
    ValidJson(input): ValidJson<tax::TaxInput>,
) -> Json<ToolResponse<tax::TaxResult>> {
    respond(ToolKind::Tax, tax::calculate(&input))
}

/// POST /api/tools/resp
pub async fn resp(
    ValidJson(input): ValidJson<resp::RespInput>,
) -> Json<ToolResponse<resp::RespResult>> {
    respond(ToolKind::Resp, resp::calculate(&input))
}

/// POST /api/tools/cpp
pub async fn cpp(
    ValidJson(input): ValidJson<cpp::CppInput>,
) -> Json<ToolResponse<cpp::CppResult>> {
    respond(ToolKind::Cpp, cpp::calculate(&input))
}
