//! Instance operations: listing, detail, minor versions, rename, creation.

use serde_json::Value;

use super::{count, page_number, page_size, PAGE_RULES};
use crate::client::Endpoint;
use crate::normalize::{self, FieldMap, NodeGroup, Payload};
use crate::rules::{NamePattern, Rule};
use crate::tools::{ArgumentSet, OperationDescriptor, ParamDef};
use crate::types::Result;

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![
        describe_db_instances(),
        describe_db_instance_detail(),
        describe_db_instance_engine_minor_versions(),
        modify_db_instance_name(),
        create_rds_mysql_instance(),
    ]
}

// =============================================================================
// describe_db_instances
// =============================================================================

const DESCRIBE_INSTANCES_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("instance_name", "InstanceName"),
    ("instance_status", "InstanceStatus"),
    ("db_engine_version", "DBEngineVersion"),
    ("create_time_start", "CreateTimeStart"),
    ("create_time_end", "CreateTimeEnd"),
    ("zone_id", "ZoneId"),
    ("charge_type", "ChargeType"),
    ("instance_type", "InstanceType"),
    ("node_spec", "NodeSpec"),
    ("tag_filters", "TagFilters"),
    ("project_name", "ProjectName"),
    ("page_number", "PageNumber"),
    ("page_size", "PageSize"),
    ("private_network_ip_address", "PrivateNetworkIpAddress"),
    ("kernel_version", "KernelVersion"),
    ("private_network_vpc_id", "PrivateNetworkVpcId"),
    ("storage_type", "StorageType"),
];

const TAG_FILTER_RULES: &[Rule] = &[Rule::required("Key")];

fn describe_db_instances() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_db_instances",
        description: "List RDS MySQL instances",
        endpoint: Endpoint::rds("DescribeDBInstances"),
        params: vec![
            page_number(),
            page_size(),
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string("instance_name", "Instance name"),
            ParamDef::string("instance_status", "Instance status, e.g. Running, Creating"),
            ParamDef::string("db_engine_version", "Engine version, e.g. MySQL_5_7, MySQL_8_0"),
            ParamDef::string("create_time_start", "Earliest creation time"),
            ParamDef::string("create_time_end", "Latest creation time"),
            ParamDef::string("zone_id", "Availability zone"),
            ParamDef::string("charge_type", "Billing type, e.g. PostPaid, PrePaid"),
            ParamDef::string("instance_type", "Instance type, e.g. DoubleNode"),
            ParamDef::string("node_spec", "Primary node spec"),
            ParamDef::object_list("tag_filters", "Tag filters; every entry needs a Key"),
            ParamDef::string("project_name", "Project name"),
            ParamDef::string(
                "private_network_ip_address",
                "IP address of the default endpoint",
            ),
            ParamDef::string_list("kernel_version", "Kernel minor versions"),
            ParamDef::string("private_network_vpc_id", "VPC ID"),
            ParamDef::string("storage_type", "Storage type, e.g. LocalSSD"),
        ],
        rules: PAGE_RULES.to_vec(),
        normalize: normalize_describe_db_instances,
    }
}

fn normalize_describe_db_instances(args: &ArgumentSet) -> Result<Payload> {
    normalize::check_elements(args, "tag_filters", TAG_FILTER_RULES)?;
    Ok(normalize::map_fields(args, DESCRIBE_INSTANCES_FIELDS))
}

// =============================================================================
// describe_db_instance_detail / engine minor versions
// =============================================================================

const INSTANCE_ID_FIELDS: FieldMap = &[("instance_id", "InstanceId")];

fn describe_db_instance_detail() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_db_instance_detail",
        description: "Show the details of one RDS MySQL instance",
        endpoint: Endpoint::rds("DescribeDBInstanceDetail"),
        params: vec![ParamDef::string("instance_id", "Instance ID")],
        rules: vec![Rule::required("instance_id")],
        normalize: |args| Ok(normalize::map_fields(args, INSTANCE_ID_FIELDS)),
    }
}

const INSTANCE_IDS_FIELDS: FieldMap = &[("instance_ids", "InstanceIds")];

fn describe_db_instance_engine_minor_versions() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_db_instance_engine_minor_versions",
        description: "List the kernel minor versions instances can upgrade to",
        endpoint: Endpoint::rds("DescribeDBInstanceEngineMinorVersions"),
        params: vec![ParamDef::string_list("instance_ids", "Instance IDs")],
        rules: vec![Rule::required("instance_ids")],
        normalize: |args| Ok(normalize::map_fields(args, INSTANCE_IDS_FIELDS)),
    }
}

// =============================================================================
// modify_db_instance_name
// =============================================================================

const RENAME_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("instance_new_name", "InstanceNewName"),
];

fn modify_db_instance_name() -> OperationDescriptor {
    OperationDescriptor {
        name: "modify_db_instance_name",
        description: "Rename an RDS MySQL instance",
        endpoint: Endpoint::rds("ModifyDBInstanceName"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string(
                "instance_new_name",
                "New name: no leading digit or hyphen; letters, CJK, digits, _ and -; 1-128 chars",
            ),
        ],
        rules: vec![
            Rule::required("instance_id"),
            Rule::required("instance_new_name"),
            Rule::pattern("instance_new_name", NamePattern::ResourceName),
        ],
        normalize: |args| Ok(normalize::map_fields(args, RENAME_FIELDS)),
    }
}

// =============================================================================
// create_rds_mysql_instance
// =============================================================================

const CREATE_INSTANCE_FIELDS: FieldMap = &[
    ("db_engine_version", "DBEngineVersion"),
    ("storage_type", "StorageType"),
    ("storage_space", "StorageSpace"),
    ("vpc_id", "VpcId"),
    ("subnet_id", "SubnetId"),
    ("instance_name", "InstanceName"),
    ("project_name", "ProjectName"),
    ("allow_list_ids", "AllowListIds"),
];

const CHARGE_FIELDS: FieldMap = &[
    ("charge_type", "ChargeType"),
    ("period_unit", "PeriodUnit"),
    ("period", "Period"),
    ("auto_renew", "AutoRenew"),
];

const DEFAULT_SPEC: &str = "rds.mysql.1c2g";

// Per-instance node limits of the service.
const MAX_SECONDARY_NODES: i64 = 9;
const MAX_READ_ONLY_NODES: i64 = 10;

fn create_rds_mysql_instance() -> OperationDescriptor {
    OperationDescriptor {
        name: "create_rds_mysql_instance",
        description: "Create an RDS MySQL instance",
        endpoint: Endpoint::rds("CreateDBInstance"),
        params: vec![
            ParamDef::string("vpc_id", "VPC ID"),
            ParamDef::string("subnet_id", "Subnet ID"),
            ParamDef::string("instance_name", "Instance name; generated when omitted"),
            ParamDef::string("db_engine_version", "Engine version, e.g. MySQL_8_0")
                .with_default("MySQL_8_0"),
            ParamDef::string("primary_zone", "Primary node zone").with_default("cn-beijing-a"),
            ParamDef::string("primary_spec", "Primary node spec").with_default(DEFAULT_SPEC),
            ParamDef::int("secondary_count", "Number of secondary nodes, 0-9").with_default(1),
            ParamDef::string(
                "secondary_zone",
                "Secondary node zone; defaults to the primary zone",
            ),
            ParamDef::string("secondary_spec", "Secondary node spec").with_default(DEFAULT_SPEC),
            ParamDef::int("read_only_count", "Number of read-only nodes, 0-10").with_default(0),
            ParamDef::string(
                "read_only_zone",
                "Read-only node zone; defaults to the primary zone",
            ),
            ParamDef::string("read_only_spec", "Read-only node spec").with_default(DEFAULT_SPEC),
            ParamDef::int("storage_space", "Storage size in GB").with_default(20),
            ParamDef::string("storage_type", "Storage type").with_default("LocalSSD"),
            ParamDef::string("charge_type", "Billing type, PostPaid or PrePaid")
                .with_default("PostPaid"),
            ParamDef::string("period_unit", "Subscription unit for PrePaid, Month or Year"),
            ParamDef::int("period", "Subscription length for PrePaid"),
            ParamDef::bool("auto_renew", "Renew the subscription automatically"),
            ParamDef::string("project_name", "Project name"),
            ParamDef::string_list("allow_list_ids", "Allow lists to bind at creation"),
        ],
        rules: vec![
            Rule::required("vpc_id"),
            Rule::required("subnet_id"),
            Rule::pattern("instance_name", NamePattern::ResourceName),
            Rule::range("secondary_count", 0, MAX_SECONDARY_NODES),
            Rule::range("read_only_count", 0, MAX_READ_ONLY_NODES),
            Rule::required_when("period_unit", "charge_type", &["PrePaid"]),
            Rule::required_when("period", "charge_type", &["PrePaid"]),
            Rule::one_of("period_unit", &["Month", "Year"]),
            Rule::at_least("period", 1),
        ],
        normalize: normalize_create_instance,
    }
}

fn normalize_create_instance(args: &ArgumentSet) -> Result<Payload> {
    let primary_zone = args.str("primary_zone").unwrap_or_default();
    let nodes = normalize::fan_out_nodes(
        primary_zone,
        args.str("primary_spec").unwrap_or_default(),
        NodeGroup {
            count: count(args, "secondary_count")?,
            zone: args.str("secondary_zone"),
            spec: args.str("secondary_spec").unwrap_or_default(),
        },
        NodeGroup {
            count: count(args, "read_only_count")?,
            zone: args.str("read_only_zone"),
            spec: args.str("read_only_spec").unwrap_or_default(),
        },
    );

    let charge_info = normalize::map_fields(args, CHARGE_FIELDS).into_map();

    let mut payload = normalize::map_fields(args, CREATE_INSTANCE_FIELDS);
    payload.insert("NodeInfo", serde_json::to_value(&nodes)?);
    payload.insert("ChargeInfo", Value::Object(charge_info));
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{payload, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_describe_instances_defaults_and_omission() {
        let body = payload("describe_db_instances", json!({"zone_id": "cn-beijing-a"}));
        assert_eq!(
            body,
            json!({"ZoneId": "cn-beijing-a", "PageNumber": 1, "PageSize": 10})
        );
    }

    #[test]
    fn test_describe_instances_page_size_bound() {
        assert!(prepare("describe_db_instances", json!({"page_size": 1000})).is_ok());
        assert!(prepare("describe_db_instances", json!({"page_size": 1001})).is_err());
        assert!(prepare("describe_db_instances", json!({"page_number": 0})).is_err());
    }

    #[test]
    fn test_describe_instances_tag_filter_needs_key() {
        let err = prepare(
            "describe_db_instances",
            json!({"tag_filters": [{"Key": "env", "Value": "prod"}, {"Value": "x"}]}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("tag_filters[1]"));

        let body = payload(
            "describe_db_instances",
            json!({"tag_filters": [{"Key": "env", "Value": "prod"}]}),
        );
        assert_eq!(body["TagFilters"], json!([{"Key": "env", "Value": "prod"}]));
    }

    #[test]
    fn test_detail_requires_instance_id() {
        let err = prepare("describe_db_instance_detail", json!({})).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            payload("describe_db_instance_detail", json!({"instance_id": "mysql-1"})),
            json!({"InstanceId": "mysql-1"})
        );
    }

    #[test]
    fn test_minor_versions_rejects_empty_list() {
        assert!(prepare(
            "describe_db_instance_engine_minor_versions",
            json!({"instance_ids": []})
        )
        .is_err());
        assert_eq!(
            payload(
                "describe_db_instance_engine_minor_versions",
                json!({"instance_ids": ["mysql-1", "mysql-2"]})
            ),
            json!({"InstanceIds": ["mysql-1", "mysql-2"]})
        );
    }

    #[test]
    fn test_rename_pattern() {
        for bad in ["", "1db", "-db", "a".repeat(129).as_str()] {
            assert!(
                prepare(
                    "modify_db_instance_name",
                    json!({"instance_id": "mysql-1", "instance_new_name": bad})
                )
                .is_err(),
                "accepted {bad:?}"
            );
        }
        for good in ["a", "订单库_primary-1", "a".repeat(128).as_str()] {
            assert!(
                prepare(
                    "modify_db_instance_name",
                    json!({"instance_id": "mysql-1", "instance_new_name": good})
                )
                .is_ok(),
                "rejected {good:?}"
            );
        }
    }

    #[test]
    fn test_create_instance_defaults() {
        let body = payload(
            "create_rds_mysql_instance",
            json!({"vpc_id": "vpc-1", "subnet_id": "subnet-1"}),
        );
        assert_eq!(
            body,
            json!({
                "DBEngineVersion": "MySQL_8_0",
                "NodeInfo": [
                    {"NodeType": "Primary", "ZoneId": "cn-beijing-a", "NodeSpec": "rds.mysql.1c2g"},
                    {"NodeType": "Secondary", "ZoneId": "cn-beijing-a", "NodeSpec": "rds.mysql.1c2g"},
                ],
                "StorageType": "LocalSSD",
                "StorageSpace": 20,
                "VpcId": "vpc-1",
                "SubnetId": "subnet-1",
                "ChargeInfo": {"ChargeType": "PostPaid"},
            })
        );
    }

    #[test]
    fn test_create_instance_node_fan_out() {
        let body = payload(
            "create_rds_mysql_instance",
            json!({
                "vpc_id": "vpc-1",
                "subnet_id": "subnet-1",
                "primary_zone": "cn-beijing-b",
                "secondary_count": 2,
                "read_only_count": 0,
            }),
        );
        let nodes = body["NodeInfo"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["NodeType"], "Primary");
        for node in &nodes[1..] {
            assert_eq!(node["NodeType"], "Secondary");
            assert_eq!(node["ZoneId"], "cn-beijing-b");
        }
    }

    #[test]
    fn test_create_instance_read_only_zone() {
        let body = payload(
            "create_rds_mysql_instance",
            json!({
                "vpc_id": "vpc-1",
                "subnet_id": "subnet-1",
                "secondary_count": 0,
                "read_only_count": 1,
                "read_only_zone": "cn-beijing-c",
            }),
        );
        assert_eq!(
            body["NodeInfo"][1],
            json!({"NodeType": "ReadOnly", "ZoneId": "cn-beijing-c", "NodeSpec": "rds.mysql.1c2g"})
        );
    }

    #[test]
    fn test_create_instance_prepaid_needs_period() {
        let base = json!({"vpc_id": "vpc-1", "subnet_id": "subnet-1", "charge_type": "PrePaid"});
        let err = prepare("create_rds_mysql_instance", base.clone()).unwrap_err();
        assert!(err.to_string().contains("period_unit"));

        let mut args = base.as_object().cloned().unwrap();
        args.insert("period_unit".to_string(), json!("Month"));
        args.insert("period".to_string(), json!(3));
        args.insert("auto_renew".to_string(), json!(true));
        let body = payload("create_rds_mysql_instance", json!(args));
        assert_eq!(
            body["ChargeInfo"],
            json!({"ChargeType": "PrePaid", "PeriodUnit": "Month", "Period": 3, "AutoRenew": true})
        );
    }

    #[test]
    fn test_create_instance_rejects_bad_name_and_counts() {
        let base = |extra: serde_json::Value| {
            let mut args = json!({"vpc_id": "vpc-1", "subnet_id": "subnet-1"});
            args.as_object_mut()
                .unwrap()
                .extend(extra.as_object().cloned().unwrap());
            args
        };
        assert!(prepare("create_rds_mysql_instance", base(json!({"instance_name": "9x"}))).is_err());
        assert!(prepare("create_rds_mysql_instance", base(json!({"instance_name": ""}))).is_err());
        assert!(
            prepare("create_rds_mysql_instance", base(json!({"secondary_count": -1}))).is_err()
        );
        assert!(prepare("create_rds_mysql_instance", base(json!({"period_unit": "Week"}))).is_err());
        assert!(prepare("create_rds_mysql_instance", json!({"vpc_id": "vpc-1"})).is_err());
    }

    #[test]
    fn test_create_instance_node_counts_are_bounded() {
        let base = |field: &str, count: i64| {
            let mut args = json!({"vpc_id": "vpc-1", "subnet_id": "subnet-1"});
            args[field] = json!(count);
            args
        };
        for field in ["secondary_count", "read_only_count"] {
            let err = prepare("create_rds_mysql_instance", base(field, i64::MAX)).unwrap_err();
            assert!(err.is_validation(), "{field}: {err}");
            assert!(err.to_string().contains(field));
            let err = prepare("create_rds_mysql_instance", base(field, 1_000_000_000)).unwrap_err();
            assert!(err.is_validation());
        }
        assert!(prepare("create_rds_mysql_instance", base("secondary_count", 10)).is_err());
        assert!(prepare("create_rds_mysql_instance", base("read_only_count", 11)).is_err());

        let mut args = base("secondary_count", 9);
        args["read_only_count"] = json!(10);
        let body = payload("create_rds_mysql_instance", args);
        assert_eq!(body["NodeInfo"].as_array().unwrap().len(), 20);
    }
}
