//! Database operations.

use super::{page_number, page_size, PAGE_RULES};
use crate::client::Endpoint;
use crate::normalize::{self, FieldMap, Payload};
use crate::rules::{NamePattern, Rule};
use crate::tools::{ArgumentSet, OperationDescriptor, ParamDef};
use crate::types::Result;

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![describe_databases(), create_database()]
}

const DESCRIBE_DATABASES_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("db_name", "DBName"),
    ("page_number", "PageNumber"),
    ("page_size", "PageSize"),
];

fn describe_databases() -> OperationDescriptor {
    let mut rules = vec![Rule::required("instance_id")];
    rules.extend(PAGE_RULES);
    OperationDescriptor {
        name: "describe_databases",
        description: "List the databases of an RDS MySQL instance",
        endpoint: Endpoint::rds("DescribeDatabases"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string("db_name", "Database name, fuzzy match"),
            page_number(),
            page_size(),
        ],
        rules,
        normalize: |args| Ok(normalize::map_fields(args, DESCRIBE_DATABASES_FIELDS)),
    }
}

const CREATE_DATABASE_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("db_name", "DBName"),
    ("character_set_name", "CharacterSetName"),
    ("database_privileges", "DatabasePrivileges"),
    ("db_desc", "DBDesc"),
];

const DATABASE_PRIVILEGE_RULES: &[Rule] = &[
    Rule::required("AccountName"),
    Rule::required("AccountPrivilege"),
    Rule::one_of(
        "AccountPrivilege",
        &["ReadWrite", "ReadOnly", "DDLOnly", "DMLOnly", "Custom"],
    ),
    Rule::required_when("AccountPrivilegeDetail", "AccountPrivilege", &["Custom"]),
];

fn create_database() -> OperationDescriptor {
    OperationDescriptor {
        name: "create_database",
        description: "Create a database on an RDS MySQL instance",
        endpoint: Endpoint::rds("CreateDatabase"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string(
                "db_name",
                "Database name: 2-64 chars, starts with a letter, ends with a letter or digit",
            ),
            ParamDef::string("character_set_name", "Character set").with_default("utf8mb4"),
            ParamDef::object_list(
                "database_privileges",
                "Grants: AccountName, Host, AccountPrivilege, AccountPrivilegeDetail",
            ),
            ParamDef::string("db_desc", "Database description, at most 256 characters"),
        ],
        rules: vec![
            Rule::required("instance_id"),
            Rule::required("db_name"),
            Rule::pattern("db_name", NamePattern::DatabaseName),
            Rule::one_of("character_set_name", &["utf8", "utf8mb4", "latin1", "ascii"]),
            Rule::max_length("db_desc", 256),
        ],
        normalize: normalize_create_database,
    }
}

fn normalize_create_database(args: &ArgumentSet) -> Result<Payload> {
    normalize::check_elements(args, "database_privileges", DATABASE_PRIVILEGE_RULES)?;
    Ok(normalize::map_fields(args, CREATE_DATABASE_FIELDS))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{payload, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_describe_databases_payload() {
        assert_eq!(
            payload(
                "describe_databases",
                json!({"instance_id": "mysql-1", "db_name": "ord", "page_size": 50})
            ),
            json!({"InstanceId": "mysql-1", "DBName": "ord", "PageNumber": 1, "PageSize": 50})
        );
    }

    #[test]
    fn test_create_database_default_charset() {
        assert_eq!(
            payload(
                "create_database",
                json!({"instance_id": "mysql-1", "db_name": "orders"})
            ),
            json!({"InstanceId": "mysql-1", "DBName": "orders", "CharacterSetName": "utf8mb4"})
        );
    }

    #[test]
    fn test_create_database_charset_enum() {
        let err = prepare(
            "create_database",
            json!({"instance_id": "mysql-1", "db_name": "orders", "character_set_name": "gbk"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("utf8mb4"));
    }

    #[test]
    fn test_create_database_name_pattern() {
        for bad in ["o", "1orders", "orders_", "a".repeat(65).as_str()] {
            assert!(
                prepare(
                    "create_database",
                    json!({"instance_id": "mysql-1", "db_name": bad})
                )
                .is_err(),
                "accepted {bad:?}"
            );
        }
        assert!(prepare(
            "create_database",
            json!({"instance_id": "mysql-1", "db_name": "a".repeat(64)})
        )
        .is_ok());
    }

    #[test]
    fn test_create_database_privilege_elements() {
        let err = prepare(
            "create_database",
            json!({
                "instance_id": "mysql-1",
                "db_name": "orders",
                "database_privileges": [
                    {"AccountName": "app", "AccountPrivilege": "ReadWrite"},
                    {"AccountName": "ops", "AccountPrivilege": "Custom"},
                ],
            }),
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("database_privileges[1]: missing required field: AccountPrivilegeDetail"));

        let body = payload(
            "create_database",
            json!({
                "instance_id": "mysql-1",
                "db_name": "orders",
                "database_privileges": [{"AccountName": "app", "AccountPrivilege": "ReadWrite"}],
                "db_desc": "",
            }),
        );
        assert_eq!(body["DBDesc"], "");
        assert_eq!(body["DatabasePrivileges"][0]["AccountName"], "app");
    }
}
