//! Instance parameters and parameter templates.

use crate::client::Endpoint;
use crate::normalize::{self, FieldMap};
use crate::rules::Rule;
use crate::tools::{OperationDescriptor, ParamDef};

pub(super) fn descriptors() -> Vec<OperationDescriptor> {
    vec![
        describe_db_instance_parameters(),
        list_parameter_templates(),
        describe_parameter_template(),
    ]
}

const INSTANCE_PARAMETERS_FIELDS: FieldMap = &[
    ("instance_id", "InstanceId"),
    ("parameter_name", "ParameterName"),
    ("node_id", "NodeId"),
];

fn describe_db_instance_parameters() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_db_instance_parameters",
        description: "List the parameters of an RDS MySQL instance",
        endpoint: Endpoint::rds("DescribeDBInstanceParameters"),
        params: vec![
            ParamDef::string("instance_id", "Instance ID"),
            ParamDef::string("parameter_name", "Parameter name"),
            ParamDef::string(
                "node_id",
                "Node to inspect; primary and secondary settings when omitted",
            ),
        ],
        rules: vec![Rule::required("instance_id")],
        normalize: |args| Ok(normalize::map_fields(args, INSTANCE_PARAMETERS_FIELDS)),
    }
}

const LIST_TEMPLATES_FIELDS: FieldMap = &[
    ("template_category", "TemplateCategory"),
    ("template_type", "TemplateType"),
    ("template_type_version", "TemplateTypeVersion"),
    ("template_source", "TemplateSource"),
    ("limit", "Limit"),
    ("offset", "Offset"),
    ("project_name", "ProjectName"),
    ("template_name", "TemplateName"),
];

fn list_parameter_templates() -> OperationDescriptor {
    OperationDescriptor {
        name: "list_parameter_templates",
        description: "List MySQL parameter templates",
        endpoint: Endpoint::rds("ListParameterTemplates"),
        params: vec![
            ParamDef::string("template_category", "Template category"),
            ParamDef::string("template_type", "Database type of the template")
                .with_default("Mysql"),
            ParamDef::string(
                "template_type_version",
                "Database version, e.g. MySQL_5_7, MySQL_8_0",
            ),
            ParamDef::string("template_source", "Template source"),
            ParamDef::int("limit", "Records per page, 1-100").with_default(10),
            ParamDef::int("offset", "Query offset").with_default(0),
            ParamDef::string("project_name", "Project name"),
            ParamDef::string("template_name", "Template name"),
        ],
        rules: vec![
            Rule::one_of("template_category", &["DBEngine"]),
            Rule::one_of("template_source", &["System", "User"]),
            Rule::range("limit", 1, 100),
            Rule::at_least("offset", 0),
        ],
        normalize: |args| Ok(normalize::map_fields(args, LIST_TEMPLATES_FIELDS)),
    }
}

const DESCRIBE_TEMPLATE_FIELDS: FieldMap = &[
    ("template_id", "TemplateId"),
    ("project_name", "ProjectName"),
];

fn describe_parameter_template() -> OperationDescriptor {
    OperationDescriptor {
        name: "describe_parameter_template",
        description: "Show the details of a parameter template",
        endpoint: Endpoint::rds("DescribeParameterTemplate"),
        params: vec![
            ParamDef::string("template_id", "Parameter template ID"),
            ParamDef::string("project_name", "Project name"),
        ],
        rules: vec![Rule::required("template_id")],
        normalize: |args| Ok(normalize::map_fields(args, DESCRIBE_TEMPLATE_FIELDS)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{payload, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_instance_parameters_payload() {
        assert_eq!(
            payload(
                "describe_db_instance_parameters",
                json!({"instance_id": "mysql-1", "parameter_name": "max_connections"})
            ),
            json!({"InstanceId": "mysql-1", "ParameterName": "max_connections"})
        );
    }

    #[test]
    fn test_list_templates_defaults() {
        assert_eq!(
            payload("list_parameter_templates", json!({})),
            json!({"TemplateType": "Mysql", "Limit": 10, "Offset": 0})
        );
    }

    #[test]
    fn test_list_templates_bounds() {
        assert!(prepare("list_parameter_templates", json!({"limit": 0})).is_err());
        assert!(prepare("list_parameter_templates", json!({"limit": 100})).is_ok());
        assert!(prepare("list_parameter_templates", json!({"limit": 101})).is_err());
        assert!(prepare("list_parameter_templates", json!({"offset": -1})).is_err());
        assert!(prepare("list_parameter_templates", json!({"template_source": "Vendor"})).is_err());
        assert!(prepare("list_parameter_templates", json!({"template_source": "User"})).is_ok());
    }

    #[test]
    fn test_describe_template_requires_id() {
        assert!(prepare("describe_parameter_template", json!({"template_id": ""})).is_err());
        assert_eq!(
            payload("describe_parameter_template", json!({"template_id": "mysql-tpl-1"})),
            json!({"TemplateId": "mysql-tpl-1"})
        );
    }
}
