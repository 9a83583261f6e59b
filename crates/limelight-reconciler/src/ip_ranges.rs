//! `limelight_ip_ranges`: the read-only Limelight IP allow list.

use crate::api::ConfigurationApi;
use crate::digest::sha256_hex;
use crate::model::IpRanges;
use reconcile_framework::ReconcileError;
use tracing::debug;

/// Fetches the allow list. The id is the hex SHA-256 of the ranges joined with `,`.
pub async fn read_ip_ranges(api: &dyn ConfigurationApi) -> Result<IpRanges, ReconcileError> {
    let list = api
        .get_ip_allow_list()
        .await
        .map_err(|e| ReconcileError::remote("get_ip_allow_list", "limelight_ip_ranges", e))?;
    let id = sha256_hex(list.ip_ranges.join(",").as_bytes());
    debug!(%id, ranges = list.ip_ranges.len(), version = list.version, "Read IP allow list");
    Ok(IpRanges {
        id,
        ip_ranges: list.ip_ranges,
        version: list.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::InMemoryLimelight;
    use crate::api::ApiError;

    #[tokio::test]
    async fn test_id_follows_the_list_contents() {
        let api = InMemoryLimelight::new();
        let first = read_ip_ranges(&api).await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(
            first.id,
            sha256_hex(b"68.142.64.0/18,69.28.128.0/18")
        );

        api.set_ip_allow_list(vec!["10.0.0.0/8".into()], 2);
        let second = read_ip_ranges(&api).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.ip_ranges, vec!["10.0.0.0/8"]);
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let api = InMemoryLimelight::new();
        api.fail_next("get_ip_allow_list", ApiError::new(502, "bad gateway"));
        let err = read_ip_ranges(&api).await.unwrap_err();
        assert_eq!(err.api_error().and_then(|e| e.status), Some(502));
    }
}
