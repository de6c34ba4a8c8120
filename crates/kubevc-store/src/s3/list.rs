//! ListObjectsV2 response model

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListBucketResult {
    #[serde(default)]
    pub contents: Vec<ObjectEntry>,
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ObjectEntry {
    pub key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CommonPrefix {
    pub prefix: String,
}

pub(crate) fn parse_list_response(xml: &str) -> Result<ListBucketResult, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contents_and_token() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>kubevc</Name>
  <Prefix>infra/</Prefix>
  <KeyCount>2</KeyCount>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>token-2</NextContinuationToken>
  <Contents>
    <Key>infra/abc123/cluster.png</Key>
    <Size>1024</Size>
  </Contents>
  <Contents>
    <Key>infra/abc123/metadata.json</Key>
    <Size>120</Size>
  </Contents>
</ListBucketResult>"#;

        let parsed = parse_list_response(xml).unwrap();
        assert_eq!(parsed.contents.len(), 2);
        assert_eq!(parsed.contents[1].key, "infra/abc123/metadata.json");
        assert!(parsed.is_truncated);
        assert_eq!(parsed.next_continuation_token.as_deref(), Some("token-2"));
    }

    #[test]
    fn test_parse_common_prefixes() {
        let xml = r#"<ListBucketResult>
  <Name>kubevc</Name>
  <Prefix></Prefix>
  <Delimiter>/</Delimiter>
  <IsTruncated>false</IsTruncated>
  <CommonPrefixes><Prefix>infra/</Prefix></CommonPrefixes>
  <CommonPrefixes><Prefix>payments/</Prefix></CommonPrefixes>
</ListBucketResult>"#;

        let parsed = parse_list_response(xml).unwrap();
        assert!(parsed.contents.is_empty());
        let prefixes: Vec<_> = parsed.common_prefixes.iter().map(|p| p.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["infra/", "payments/"]);
        assert!(!parsed.is_truncated);
    }
}
