use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{is_already_exists, string_field_list, string_list, CloudGateway, DEMO_ACCOUNT_ID};

// ---

pub const DEFAULT_POLICY: &str = "AmazonS3ReadOnlyAccess";

#[derive(Debug, Clone, Serialize)]
pub struct RoleInfo {
    pub role_name: String,
    pub role_arn: String,
    pub policies: Vec<String>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSummary {
    #[serde(rename(deserialize = "RoleName"))]
    pub role_name: String,
    #[serde(rename(deserialize = "Arn"))]
    pub role_arn: String,
    #[serde(rename(deserialize = "CreateDate"), default)]
    pub create_date: String,
    #[serde(rename(deserialize = "Description"), default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListRolesResponse {
    #[serde(default)]
    roles: Vec<RoleSummary>,
}

/// Managed policy names are expanded to their ARN; ARNs pass through.
fn policy_arn(policy: &str) -> String {
    if policy.starts_with("arn:") {
        policy.to_string()
    } else {
        format!("arn:aws:iam::aws:policy/{policy}")
    }
}

fn function_trust_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
}

impl CloudGateway {
    // ---
    /// Create a role assumable by processing functions and attach `policies`
    /// (the S3 read-only policy when empty). An existing role is reused.
    /// Attach failures are logged and skipped. `None` when creation fails.
    pub async fn create_role(&self, role_name: &str, policies: &[String]) -> Option<RoleInfo> {
        // ---
        let policies = if policies.is_empty() {
            vec![DEFAULT_POLICY.to_string()]
        } else {
            policies.to_vec()
        };

        let body = json!({
            "RoleName": role_name,
            "AssumeRolePolicyDocument": function_trust_policy().to_string(),
            "Description": format!("IAM role for {role_name}"),
        });
        match self.call("iam", "CreateRole", body).await {
            Ok(_) => tracing::info!("Created role {}", role_name),
            Err(e) if is_already_exists(&e) || format!("{e:#}").contains("EntityAlreadyExists") => {
                tracing::debug!("Role {} already exists", role_name)
            }
            Err(e) => {
                tracing::error!("Failed to create role {}: {:#}", role_name, e);
                return None;
            }
        }

        for policy in &policies {
            let attach = json!({ "RoleName": role_name, "PolicyArn": policy_arn(policy) });
            if let Err(e) = self.call("iam", "AttachRolePolicy", attach).await {
                tracing::warn!("Failed to attach {} to {}: {:#}", policy, role_name, e);
            }
        }

        Some(RoleInfo {
            role_name: role_name.to_string(),
            role_arn: format!("arn:aws:iam::{DEMO_ACCOUNT_ID}:role/{role_name}"),
            policies,
            status: "created",
        })
    }

    /// Every role in the account. Empty on failure.
    pub async fn list_roles(&self) -> Vec<RoleSummary> {
        // ---
        let reply = match self.call("iam", "ListRoles", json!({})).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to list roles: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<ListRolesResponse>(reply) {
            Ok(listing) => listing.roles,
            Err(e) => {
                tracing::error!("Unexpected ListRoles reply: {}", e);
                Vec::new()
            }
        }
    }

    async fn detach_and_delete_role(&self, role_name: &str) -> Result<()> {
        // ---
        let attached = self
            .call("iam", "ListAttachedRolePolicies", json!({ "RoleName": role_name }))
            .await?;
        for arn in string_field_list(&attached, "AttachedPolicies", "PolicyArn") {
            self.call("iam", "DetachRolePolicy", json!({ "RoleName": role_name, "PolicyArn": arn }))
                .await?;
        }

        let inline = self
            .call("iam", "ListRolePolicies", json!({ "RoleName": role_name }))
            .await?;
        for name in string_list(&inline, "PolicyNames") {
            self.call("iam", "DeleteRolePolicy", json!({ "RoleName": role_name, "PolicyName": name }))
                .await?;
        }

        self.call("iam", "DeleteRole", json!({ "RoleName": role_name }))
            .await?;
        Ok(())
    }

    /// Detach managed policies, drop inline ones, then delete the role.
    pub async fn delete_role(&self, role_name: &str) -> bool {
        // ---
        match self.detach_and_delete_role(role_name).await {
            Ok(()) => {
                tracing::info!("Deleted role {}", role_name);
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete role {}: {:#}", role_name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::gateway::tests::unreachable_gateway;

    #[test]
    fn test_policy_arn() {
        // ---
        assert_eq!(policy_arn("AmazonS3ReadOnlyAccess"), "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess");
        assert_eq!(policy_arn("arn:aws:iam::1:policy/custom"), "arn:aws:iam::1:policy/custom");
    }

    #[test]
    fn test_role_listing_decoding() {
        // ---
        let listing: ListRolesResponse = serde_json::from_value(json!({
            "Roles": [{"RoleName": "r1", "Arn": "arn:r1", "CreateDate": "2025-01-01T00:00:00Z"}]
        }))
        .unwrap();
        let role = &listing.roles[0];
        assert_eq!(role.role_name, "r1");
        assert_eq!(role.description, "");
    }

    #[tokio::test]
    async fn test_fallbacks_when_unreachable() {
        // ---
        let gateway = unreachable_gateway();
        assert!(gateway.create_role("processor-role", &[]).await.is_none());
        assert!(gateway.list_roles().await.is_empty());
        assert!(!gateway.delete_role("processor-role").await);
    }
}
