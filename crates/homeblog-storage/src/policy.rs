//! Bucket access policy installed when a bucket is first created.

use serde_json::json;

/// Policy granting anonymous `s3:GetObject` on every object in `bucket`.
///
/// Generated public URLs are only fetchable without signing because of this policy.
/// Listing the bucket is deliberately not granted.
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": ["*"] },
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{}/*", bucket)]
            }
        ]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn grants_anonymous_get_object_only() {
        let policy: Value = serde_json::from_str(&public_read_policy("uploads")).unwrap();

        let statements = policy["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 1);

        let statement = &statements[0];
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"]["AWS"][0], "*");
        assert_eq!(statement["Action"], json!(["s3:GetObject"]));
        assert_eq!(statement["Resource"], json!(["arn:aws:s3:::uploads/*"]));
        assert_eq!(policy["Version"], "2012-10-17");
    }
}
