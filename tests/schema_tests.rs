//! Integration tests for table metadata and typecast declarations

use oracle_enhanced::{
    ColumnDescriptor, ColumnType, OracleDate, Record, SchemaCache, SchemaCatalog, TableSchema,
    Value,
};

fn employees() -> TableSchema {
    TableSchema::new("employees")
        .column(ColumnDescriptor::new("id", "NUMBER(38,0)"))
        .column(ColumnDescriptor::new("active", "NUMBER(1)"))
        .column(ColumnDescriptor::new("level_code", "NUMBER(1)"))
        .column(ColumnDescriptor::new("hired_on", "DATE"))
        .column(ColumnDescriptor::new("is_manager", "CHAR(1)"))
        .column(ColumnDescriptor::new("cv", "CLOB"))
        .column(ColumnDescriptor::new("photo", "BLOB"))
        .column(ColumnDescriptor::new("full_name", "VARCHAR2(200)").virtual_column())
        .comment("Staff records")
}

fn catalog() -> SchemaCache {
    let mut catalog = SchemaCache::new();
    catalog.register(employees()).unwrap();
    catalog
}

mod catalog_tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(catalog.schema("EMPLOYEES").unwrap().table_name(), "employees");
    }

    #[test]
    fn test_unknown_table() {
        let err = catalog().schema("payroll").unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_table_comment() {
        let catalog = catalog();
        assert_eq!(
            catalog.table_comment("employees").unwrap().as_deref(),
            Some("Staff records")
        );
    }

    #[test]
    fn test_lob_and_virtual_columns() {
        let catalog = catalog();
        let lobs: Vec<String> = catalog
            .lob_columns("employees")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(lobs, vec!["cv", "photo"]);

        let virtuals = catalog.virtual_columns("employees").unwrap();
        assert_eq!(virtuals.len(), 1);
        assert_eq!(virtuals[0].name, "full_name");
    }

    #[test]
    fn test_ignored_columns_disappear() {
        let mut catalog = catalog();
        catalog.ignore_table_columns("employees", ["photo"]).unwrap();
        let schema = catalog.schema("employees").unwrap();
        assert!(schema.find_column("photo").is_none());
        assert_eq!(schema.lob_columns().len(), 1);
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut catalog = SchemaCache::new();
        let err = catalog
            .register(employees().serialize("missing"))
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(catalog.is_empty());
    }
}

mod typecast_tests {
    use super::*;

    #[test]
    fn test_number_1_defaults_to_boolean() {
        let schema = catalog().schema("employees").unwrap();
        assert_eq!(
            schema.find_column("active").unwrap().column_type,
            ColumnType::Boolean
        );
    }

    #[test]
    fn test_set_integer_columns() {
        let mut catalog = catalog();
        catalog.set_integer_columns("employees", ["level_code"]).unwrap();
        let schema = catalog.schema("employees").unwrap();

        let mut record = Record::loaded("employees", [("id", Value::Integer(1))]);
        record.write_attribute(&schema, "level_code", "7").unwrap();
        assert_eq!(record.get("level_code"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_set_boolean_columns() {
        let mut catalog = catalog();
        catalog.set_boolean_columns("employees", ["is_manager"]).unwrap();
        let schema = catalog.schema("employees").unwrap();

        let mut record = Record::loaded("employees", [("id", Value::Integer(1))]);
        record.write_attribute(&schema, "is_manager", "Y").unwrap();
        assert_eq!(record.get("is_manager"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_set_date_columns_truncates_time() {
        let mut catalog = catalog();
        catalog.set_date_columns("employees", ["hired_on"]).unwrap();
        let schema = catalog.schema("employees").unwrap();

        let mut record = Record::loaded("employees", [("id", Value::Integer(1))]);
        record
            .write_attribute(&schema, "hired_on", "2011-03-15 14:30:00")
            .unwrap();
        assert_eq!(
            record.get("hired_on"),
            Some(&Value::Date(OracleDate::date(2011, 3, 15)))
        );
    }

    #[test]
    fn test_unknown_column_declaration() {
        let mut catalog = catalog();
        let err = catalog
            .set_string_columns("employees", ["nickname"])
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_declaration_keeps_lob_flag() {
        let mut catalog = catalog();
        catalog.set_string_columns("employees", ["cv"]).unwrap();
        let schema = catalog.schema("employees").unwrap();
        assert!(schema.find_column("cv").unwrap().is_lob());
    }

    #[test]
    fn test_declaration_does_not_leak_into_shared_schema() {
        let mut catalog = catalog();
        let before = catalog.schema("employees").unwrap();
        catalog.set_integer_columns("employees", ["active"]).unwrap();
        assert_eq!(
            before.find_column("active").unwrap().column_type,
            ColumnType::Boolean
        );
    }
}
