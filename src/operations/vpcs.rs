//! VPC lookup, sent to the VPC service as a flat query string.

use crate::client::Endpoint;
use crate::normalize::{self, FieldMap, Payload};
use crate::rules::Rule;
use crate::tools::{ArgumentSet, OperationDescriptor, ParamDef, ParamType};
use crate::types::Result;

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![describe_vpcs()]
}

const DESCRIBE_VPCS_FIELDS: FieldMap = &[
    ("vpc_name", "VpcName"),
    ("project_name", "ProjectName"),
    ("is_default", "IsDefault"),
    ("vpc_owner_id", "VpcOwnerId"),
    ("page_number", "PageNumber"),
    ("page_size", "PageSize"),
    ("next_token", "NextToken"),
    ("max_results", "MaxResults"),
];

fn describe_vpcs() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_vpcs",
        description: "List VPCs matching the given conditions",
        endpoint: Endpoint::vpc("DescribeVpcs"),
        params: vec![
            ParamDef::string_list("vpc_ids", "VPC IDs, at most 100"),
            ParamDef::string("vpc_name", "VPC name"),
            ParamDef::string("project_name", "Project name"),
            ParamDef::new(
                "tag_filters",
                ParamType::StringListMap,
                "Tag key to accepted values; at most 10 keys and 3 values per key",
            ),
            ParamDef::bool("is_default", "Only the default VPC"),
            ParamDef::int("vpc_owner_id", "Owner account ID"),
            ParamDef::int("page_number", "Page number"),
            ParamDef::int("page_size", "Records per page, 1-100"),
            ParamDef::string("next_token", "Pagination token"),
            ParamDef::int("max_results", "Records to return, 1-100"),
        ],
        rules: vec![
            Rule::max_count("vpc_ids", 100),
            Rule::max_count("tag_filters", 10),
            Rule::ValuesPerKey {
                field: "tag_filters",
                max: 3,
            },
            Rule::at_least("page_number", 1),
            Rule::range("page_size", 1, 100),
            Rule::range("max_results", 1, 100),
        ],
        normalize: normalize_describe_vpcs,
    }
}

fn normalize_describe_vpcs(args: &ArgumentSet) -> Result<Payload> {
    let mut payload = normalize::map_fields(args, DESCRIBE_VPCS_FIELDS);
    if let Some(ids) = args.array("vpc_ids") {
        normalize::expand_indexed(&mut payload, "VpcIds", ids);
    }
    if let Some(tags) = args.object("tag_filters") {
        normalize::expand_tag_map(&mut payload, "TagFilters", tags);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{payload, prepare};
    use crate::client::Service;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_describe_vpcs_targets_vpc_service() {
        let request = prepare("describe_vpcs", json!({})).unwrap();
        assert_eq!(request.endpoint.service, Service::Vpc);
        assert!(request.payload.is_empty());
    }

    #[test]
    fn test_vpc_ids_expand_in_order() {
        let request = prepare(
            "describe_vpcs",
            json!({"vpc_ids": ["vpc-b", "vpc-a"], "is_default": false}),
        )
        .unwrap();
        assert_eq!(
            request.payload.keys().collect::<Vec<_>>(),
            vec!["IsDefault", "VpcIds.1", "VpcIds.2"]
        );
        assert_eq!(request.payload.get("VpcIds.1"), Some(&json!("vpc-b")));
    }

    #[test]
    fn test_tag_filters_expand() {
        assert_eq!(
            payload("describe_vpcs", json!({"tag_filters": {"env": ["prod", "dev"]}})),
            json!({
                "TagFilters.1.Key": "env",
                "TagFilters.1.Values.1": "prod",
                "TagFilters.1.Values.2": "dev",
            })
        );
    }

    #[test]
    fn test_describe_vpcs_bounds() {
        let ids: Vec<String> = (0..101).map(|i| format!("vpc-{i}")).collect();
        assert!(prepare("describe_vpcs", json!({ "vpc_ids": ids })).is_err());

        let keys: serde_json::Map<String, serde_json::Value> =
            (0..11).map(|i| (format!("k{i}"), json!(["v"]))).collect();
        assert!(prepare("describe_vpcs", json!({ "tag_filters": keys })).is_err());

        assert!(prepare(
            "describe_vpcs",
            json!({"tag_filters": {"env": ["a", "b", "c", "d"]}})
        )
        .is_err());
        assert!(prepare("describe_vpcs", json!({"page_size": 101})).is_err());
        assert!(prepare("describe_vpcs", json!({"max_results": 0})).is_err());
        assert!(prepare("describe_vpcs", json!({"max_results": 100})).is_ok());
    }
}
