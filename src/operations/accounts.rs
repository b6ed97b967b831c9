//! Database account operations.

use super::{page_number, page_size, PAGE_RULES};
use crate::client::Endpoint;
use crate::normalize::{self, FieldMap, Payload};
use crate::rules::{NamePattern, Rule, PASSWORD_CLASSES};
use crate::tools::{ArgumentSet, OperationDescriptor, ParamDef};
use crate::types::Result;

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![
        describe_db_accounts(),
        create_db_account(),
        modify_db_account_description(),
    ]
}

const ACCOUNT_TYPES: &[&str] = &["Super", "Normal"];

const ACCOUNT_PRIVILEGES: &[&str] = &[
    "ReadWrite", "ReadOnly", "DDLOnly", "DMLOnly", "Custom", "Global", "None",
];

fn host() -> ParamDef {
    ParamDef::string(
        "host",
        "Address the account may connect from; % allows any. Super accounts must use %",
    )
    .with_default("%")
}

// =============================================================================
// describe_db_accounts
// =============================================================================

const DESCRIBE_ACCOUNTS_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("account_name", "AccountName"),
    ("page_number", "PageNumber"),
    ("page_size", "PageSize"),
];

fn describe_db_accounts() -> OperationDescriptor {
    let mut rules = vec![Rule::required("instance_id")];
    rules.extend(PAGE_RULES);
    OperationDescriptor {
        name: "describe_db_accounts",
        description: "List the database accounts of an RDS MySQL instance",
        endpoint: Endpoint::rds("DescribeDBAccounts"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string("account_name", "Account name, fuzzy match"),
            page_number(),
            page_size(),
        ],
        rules,
        normalize: |args| Ok(normalize::map_fields(args, DESCRIBE_ACCOUNTS_FIELDS)),
    }
}

// =============================================================================
// create_db_account
// =============================================================================

const CREATE_ACCOUNT_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("account_name", "AccountName"),
    ("account_desc", "AccountDesc"),
    ("host", "Host"),
    ("account_password", "AccountPassword"),
    ("account_type", "AccountType"),
    ("account_privileges", "AccountPrivileges"),
    ("dry_run", "DryRun"),
    ("table_column_privileges", "TableColumnPrivileges"),
];

const ACCOUNT_PRIVILEGE_RULES: &[Rule] = &[
    Rule::required("DBName"),
    Rule::required("AccountPrivilege"),
    Rule::one_of("AccountPrivilege", ACCOUNT_PRIVILEGES),
    Rule::required_when("AccountPrivilegeDetail", "AccountPrivilege", &["Custom", "Global"]),
];

const TABLE_COLUMN_PRIVILEGE_RULES: &[Rule] = &[Rule::required("DBName")];

fn create_db_account() -> OperationDescriptor {
    OperationDescriptor {
        name: "create_db_account",
        description: "Create a database account on an RDS MySQL instance",
        endpoint: Endpoint::rds("CreateDBAccount"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string(
                "account_name",
                "Account name: 2-32 chars, starts with a letter, ends with a letter or digit",
            ),
            ParamDef::string(
                "account_password",
                "Password: 8-32 chars with at least 3 of uppercase, lowercase, digits, \
                 special characters !@#$%^&*()_+-=,.&?|/",
            ),
            ParamDef::string("account_type", "Account type"),
            ParamDef::string("account_desc", "Account description, at most 256 characters"),
            host(),
            ParamDef::object_list(
                "account_privileges",
                "Per-database privileges: DBName, AccountPrivilege, AccountPrivilegeDetail",
            ),
            ParamDef::bool("dry_run", "Only preview the SQL that would run").with_default(false),
            ParamDef::object_list(
                "table_column_privileges",
                "Table and column privileges: DBName, TablePrivileges, ColumnPrivileges",
            ),
        ],
        rules: vec![
            Rule::required("instance_id"),
            Rule::required("account_name"),
            Rule::required("account_password"),
            Rule::required("account_type"),
            Rule::pattern("account_name", NamePattern::AccountName),
            Rule::length("account_password", 8, 32),
            Rule::Complexity {
                field: "account_password",
                min_classes: 3,
                classes: PASSWORD_CLASSES,
            },
            Rule::one_of("account_type", ACCOUNT_TYPES),
            Rule::ConditionalValue {
                field: "host",
                expected: "%",
                when: "account_type",
                equals: "Super",
            },
            Rule::max_length("account_desc", 256),
        ],
        normalize: normalize_create_db_account,
    }
}

fn normalize_create_db_account(args: &ArgumentSet) -> Result<Payload> {
    normalize::check_elements(args, "account_privileges", ACCOUNT_PRIVILEGE_RULES)?;
    normalize::check_elements(args, "table_column_privileges", TABLE_COLUMN_PRIVILEGE_RULES)?;
    Ok(normalize::map_fields(args, CREATE_ACCOUNT_FIELDS))
}

// =============================================================================
// modify_db_account_description
// =============================================================================

const MODIFY_DESCRIPTION_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("account_name", "AccountName"),
    ("host", "Host"),
    ("account_desc", "AccountDesc"),
];

fn modify_db_account_description() -> OperationDescriptor {
    OperationDescriptor {
        name: "modify_db_account_description",
        description: "Change the description of a database account",
        endpoint: Endpoint::rds("ModifyDBAccountDescription"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string("account_name", "Account name"),
            host(),
            ParamDef::string(
                "account_desc",
                "New description, at most 256 characters; empty or omitted clears it",
            ),
        ],
        rules: vec![
            Rule::required("instance_id"),
            Rule::required("account_name"),
            Rule::max_length("account_desc", 256),
        ],
        normalize: |args| Ok(normalize::map_fields(args, MODIFY_DESCRIPTION_FIELDS)),
    }
}
