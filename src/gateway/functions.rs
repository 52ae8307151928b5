use serde::Serialize;
use serde_json::{json, Value};

use super::{unix_timestamp, CloudGateway, DEMO_ACCOUNT_ID};

// ---

const RUNTIME: &str = "python3.9";
const HANDLER: &str = "lambda_function.lambda_handler";
const EXECUTION_ROLE: &str = "arn:aws:iam::123456789012:role/lambda-execution-role";

/// Kind of processing function. Unknown names fall back to `DataProcessor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    DataProcessor,
    CleanupCoordinator,
    AlertSystem,
}

impl FunctionKind {
    // ---
    pub fn parse(name: &str) -> Self {
        match name {
            "cleanup_coordinator" => FunctionKind::CleanupCoordinator,
            "alert_system" => FunctionKind::AlertSystem,
            _ => FunctionKind::DataProcessor,
        }
    }

    fn handler_description(self) -> &'static str {
        match self {
            FunctionKind::DataProcessor => {
                "Classifies incoming sensor readings by pollution level and archives them"
            }
            FunctionKind::CleanupCoordinator => {
                "Assigns drones and vessels to hotspots and schedules cleanup missions"
            }
            FunctionKind::AlertSystem => {
                "Raises alerts for critical readings and notifies subscribed authorities"
            }
        }
    }
}

/// Descriptor returned by the function creation stub.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescriptor {
    pub function_name: String,
    pub function_arn: String,
    /// Type as requested by the caller.
    pub function_type: String,
    pub handler_description: &'static str,
    pub status: &'static str,
    pub runtime: &'static str,
    pub handler: &'static str,
    pub timeout: u32,
    pub memory_size: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportProcessor {
    pub function_name: String,
    pub status: &'static str,
    pub response: Value,
}

impl CloudGateway {
    // ---
    /// FUNCTION STUB: describes the function that would be deployed.
    pub fn create_function(&self, name: &str, function_type: &str) -> FunctionDescriptor {
        // ---
        let kind = FunctionKind::parse(function_type);
        FunctionDescriptor {
            function_name: name.to_string(),
            function_arn: format!(
                "arn:aws:lambda:{}:{DEMO_ACCOUNT_ID}:function:{name}",
                self.region
            ),
            function_type: function_type.to_string(),
            handler_description: kind.handler_description(),
            status: "simulated_created",
            runtime: RUNTIME,
            handler: HANDLER,
            timeout: 30,
            memory_size: 256,
        }
    }

    /// Deploy the citizen report processing function. `None` on failure.
    pub async fn create_report_processor(&self) -> Option<ReportProcessor> {
        // ---
        let function_name = format!("citizen-report-processor-{}", unix_timestamp());
        let body = json!({
            "FunctionName": function_name,
            "Runtime": RUNTIME,
            "Role": EXECUTION_ROLE,
            "Handler": HANDLER,
            "Description": "Process citizen harmful algae bloom reports",
            "Timeout": 30,
            "MemorySize": 128,
        });

        match self.call("functions", "CreateFunction", body).await {
            Ok(response) => Some(ReportProcessor {
                function_name,
                status: "created",
                response,
            }),
            Err(e) => {
                tracing::error!("Failed to create report processor {}: {:#}", function_name, e);
                None
            }
        }
    }
}
