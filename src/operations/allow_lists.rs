//! Allow-list (IP whitelist) operations.

use crate::client::Endpoint;
use crate::normalize::{self, FieldMap, Payload};
use crate::rules::{NamePattern, Rule};
use crate::tools::{ArgumentSet, OperationDescriptor, ParamDef};
use crate::types::Result;

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![create_allow_list(), associate_allow_list()]
}

const CREATE_ALLOW_LIST_FIELDS: FieldMap = &[
    ("allow_list_name", "AllowListName"),
    ("allow_list_desc", "AllowListDesc"),
    ("allow_list_type", "AllowListType"),
    ("allow_list", "AllowList"),
    ("security_group_ids", "SecurityGroupIds"),
    ("security_group_bind_infos", "SecurityGroupBindInfos"),
    ("allow_list_category", "AllowListCategory"),
    ("user_allow_list", "UserAllowList"),
    ("project_name", "ProjectName"),
];

const BIND_INFO_RULES: &[Rule] = &[
    Rule::required("BindMode"),
    Rule::one_of("BindMode", &["IngressDirectionIp", "AssociateEcsIp"]),
    Rule::required("SecurityGroupId"),
];

fn create_allow_list() -> OperationDescriptor {
    OperationDescriptor {
        name: "create_allow_list",
        description: "Create an RDS MySQL allow list",
        endpoint: Endpoint::rds("CreateAllowList"),
        params: vec![
            ParamDef::string(
                "allow_list_name",
                "Name: no leading digit or hyphen; letters, CJK, digits, _ and -; 1-128 chars",
            ),
            ParamDef::string("allow_list_desc", "Description, at most 200 characters"),
            ParamDef::string("allow_list_type", "Address type").with_default("IPv4"),
            ParamDef::string(
                "allow_list",
                "Comma-separated IP addresses or CIDR blocks; excludes user_allow_list",
            ),
            ParamDef::string_list(
                "security_group_ids",
                "Security groups to associate, at most 10; excludes security_group_bind_infos",
            ),
            ParamDef::object_list(
                "security_group_bind_infos",
                "Security group bindings: BindMode, SecurityGroupId, IpList, SecurityGroupName",
            ),
            ParamDef::string("allow_list_category", "Allow list category")
                .with_default("Ordinary"),
            ParamDef::string(
                "user_allow_list",
                "Addresses outside security groups; excludes allow_list",
            ),
            ParamDef::string("project_name", "Project name"),
        ],
        rules: vec![
            Rule::required("allow_list_name"),
            Rule::pattern("allow_list_name", NamePattern::ResourceName),
            Rule::max_length("allow_list_desc", 200),
            Rule::one_of("allow_list_type", &["IPv4"]),
            Rule::one_of("allow_list_category", &["Ordinary", "Default"]),
            Rule::exclusive("allow_list", "user_allow_list"),
            Rule::exclusive("security_group_ids", "security_group_bind_infos"),
            Rule::max_count("security_group_ids", 10),
        ],
        normalize: normalize_create_allow_list,
    }
}

fn normalize_create_allow_list(args: &ArgumentSet) -> Result<Payload> {
    normalize::check_elements(args, "security_group_bind_infos", BIND_INFO_RULES)?;
    Ok(normalize::map_fields(args, CREATE_ALLOW_LIST_FIELDS))
}

const ASSOCIATE_FIELDS: FieldMap = &[
    ("instance_ids", "InstanceIds"),
    ("allow_list_ids", "AllowListIds"),
];

fn associate_allow_list() -> OperationDescriptor {
    OperationDescriptor {
        name: "associate_allow_list",
        description: "Bind RDS MySQL instances to allow lists",
        endpoint: Endpoint::rds("AssociateAllowList"),
        params: vec![
            ParamDef::string_list(
                "instance_ids",
                "Instances to bind, at most 200; must hold one entry when several allow lists are given",
            ),
            ParamDef::string_list(
                "allow_list_ids",
                "Allow lists to bind, at most 100; must hold one entry when several instances are given",
            ),
        ],
        rules: vec![
            Rule::required("instance_ids"),
            Rule::required("allow_list_ids"),
            Rule::max_count("instance_ids", 200),
            Rule::max_count("allow_list_ids", 100),
            Rule::PairedCardinality("instance_ids", "allow_list_ids"),
        ],
        normalize: |args| Ok(normalize::map_fields(args, ASSOCIATE_FIELDS)),
    }
}
