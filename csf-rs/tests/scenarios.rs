//! Reading and writing Kerberos factories through the public API.

use std::path::PathBuf;

use elytron_csf::constants::{
    DEBUG, KERBEROS_SECURITY_FACTORY, MECHANISM_OIDS, MINIMUM_REMAINING_LIFETIME, PATH, PRINCIPAL,
    RELATIVE_TO, REQUEST_LIFETIME, SERVER,
};
use elytron_csf::{
    any_namespace, parse_file, parse_str, CredentialSecurityFactoryParser, Error, ModelNode,
    Operation, PathAddress, SubsystemModel, SubsystemParser, XmlStreamReader, XmlWriterOptions,
};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn parent() -> PathAddress {
    PathAddress::root().append("subsystem", "elytron")
}

fn oids(values: &[&str]) -> ModelNode {
    ModelNode::List(values.iter().map(|v| ModelNode::from(*v)).collect())
}

fn factory(attributes: &str) -> String {
    format!(
        "<credential-security-factories><kerberos-security-factory {attributes}/></credential-security-factories>"
    )
}

#[test]
fn test_minimal_factory() {
    let ops = parse_file(data("minimal.xml"), &parent()).unwrap();
    assert_eq!(ops.len(), 1);

    let op = &ops[0];
    assert_eq!(op.name(), "add");
    let last = op.address().last().unwrap();
    assert_eq!(last.key, KERBEROS_SECURITY_FACTORY);
    assert_eq!(last.value, "k1");
    assert_eq!(op.parameter(PRINCIPAL), Some(&ModelNode::from("HTTP/host@R")));
    assert_eq!(op.parameter(PATH), Some(&ModelNode::from("/etc/kt")));
    assert_eq!(
        op.parameter(MECHANISM_OIDS),
        Some(&oids(&["1.2.840.113554.1.2.2"]))
    );
    assert_eq!(op.parameters().keys().count(), 3);
}

#[test]
fn test_all_attributes() {
    let ops = parse_file(data("all-attributes.xml"), &parent()).unwrap();
    let op = &ops[0];
    assert_eq!(
        op.parameter(RELATIVE_TO),
        Some(&ModelNode::from("jboss.server.config.dir"))
    );
    assert_eq!(op.parameter(SERVER), Some(&ModelNode::Boolean(true)));
    assert_eq!(op.parameter(MINIMUM_REMAINING_LIFETIME), Some(&ModelNode::Int(10)));
    assert_eq!(op.parameter(REQUEST_LIFETIME), Some(&ModelNode::Int(3600)));
    assert_eq!(op.parameter(DEBUG), Some(&ModelNode::Boolean(false)));
    assert_eq!(
        op.parameter(MECHANISM_OIDS),
        Some(&oids(&["1.2.840.113554.1.2.2", "1.3.6.1.5.5.2"]))
    );
}

#[test]
fn test_missing_path() {
    let xml = factory(r#"name="k1" principal="p" mechanism-oids="1.2""#);
    match parse_str(&xml, &parent()).unwrap_err() {
        Error::MissingRequired { attributes, location } => {
            assert_eq!(attributes, vec!["path"]);
            assert_eq!(location.line, 1);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_unknown_attribute() {
    let xml = factory(r#"name="k1" principal="p" path="/kt" mechanism-oids="1.2" foo="bar""#);
    let err = parse_str(&xml, &parent()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedAttribute { ref name, .. } if name == "foo"));
}

#[test]
fn test_namespaced_attribute_rejected_even_if_known() {
    let xml = r#"<credential-security-factories xmlns:x="urn:x">
        <kerberos-security-factory name="k1" principal="p" path="/kt" mechanism-oids="1.2" x:debug="true"/>
    </credential-security-factories>"#;
    let err = parse_str(xml, &parent()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedAttribute { ref name, .. } if name == "{urn:x}debug"));
}

#[test]
fn test_element_body_rejected() {
    let xml = r#"<credential-security-factories>
        <kerberos-security-factory name="k1" principal="p" path="/kt" mechanism-oids="1.2"><x/></kerberos-security-factory>
    </credential-security-factories>"#;
    let err = parse_str(xml, &parent()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedContent { ref element, .. } if element == KERBEROS_SECURITY_FACTORY));

    let xml = r#"<credential-security-factories>
        <kerberos-security-factory name="k1" principal="p" path="/kt" mechanism-oids="1.2">text</kerberos-security-factory>
    </credential-security-factories>"#;
    let err = parse_str(xml, &parent()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedContent { .. }));
}

#[test]
fn test_invalid_values_located() {
    let xml = "<credential-security-factories>\n  <kerberos-security-factory name=\"k1\" principal=\"p\" path=\"/kt\" mechanism-oids=\"1.2\" request-lifetime=\"-5\"/>\n</credential-security-factories>";
    match parse_str(xml, &parent()).unwrap_err() {
        Error::InvalidValue {
            attribute, location, ..
        } => {
            assert_eq!(attribute, REQUEST_LIFETIME);
            assert_eq!(location.line, 2);
        }
        other => panic!("unexpected error {other}"),
    }

    let xml = factory(r#"name="k1" principal="" path="/kt" mechanism-oids="1.2""#);
    assert!(matches!(
        parse_str(&xml, &parent()).unwrap_err(),
        Error::InvalidValue { .. }
    ));
}

#[test]
fn test_no_operations_after_failure() {
    let xml = r#"<credential-security-factories>
        <kerberos-security-factory name="k1" principal="p" path="/kt" mechanism-oids="1.2"/>
        <kerberos-security-factory name="k2" principal="p" mechanism-oids="1.2"/>
        <kerberos-security-factory name="k3" principal="p" path="/kt" mechanism-oids="1.2"/>
    </credential-security-factories>"#;
    assert!(parse_str(xml, &parent()).is_err());

    let mut reader = XmlStreamReader::new(xml);
    reader.next_tag().unwrap();
    let mut operations = Vec::new();
    let err = CredentialSecurityFactoryParser::new(any_namespace)
        .read_credential_security_factories(&parent(), &mut reader, &mut operations)
        .unwrap_err();
    assert!(matches!(err, Error::MissingRequired { .. }));
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].address().last().unwrap().value, "k1");
}

#[test]
fn test_write_then_read() {
    let ops = parse_file(data("all-attributes.xml"), &parent()).unwrap();
    let original = &ops[0];

    let parser = SubsystemParser::default();
    let mut model = SubsystemModel::new(parser.address().clone());
    model.apply(&Operation::add(parser.address().clone())).unwrap();
    model.apply(original).unwrap();

    let xml = parser
        .write_to_string(model.node(), XmlWriterOptions::default())
        .unwrap();
    assert_eq!(
        xml,
        concat!(
            r#"<subsystem xmlns="urn:wildfly:elytron:1.0">"#,
            "<credential-security-factories>",
            r#"<kerberos-security-factory name="k2" principal="HTTP/host@R" path="/etc/kt" "#,
            r#"relative-to="jboss.server.config.dir" minimum-remaining-lifetime="10" "#,
            r#"request-lifetime="3600" mechanism-oids="1.2.840.113554.1.2.2 1.3.6.1.5.5.2"/>"#,
            "</credential-security-factories>",
            "</subsystem>"
        )
    );

    let reread = parser.parse_str(&xml).unwrap();
    assert_eq!(reread.len(), 2);

    // server="true" and debug="false" are defaults and are not written back.
    let mut expected = original.clone();
    if let ModelNode::Object(slots) = expected.parameters_mut() {
        slots.shift_remove(SERVER);
        slots.shift_remove(DEBUG);
    }
    assert_eq!(reread[1], expected);
}

#[test]
fn test_subsystem_document() {
    let parser = SubsystemParser::default();
    let ops = parser.parse_file(data("subsystem.xml")).unwrap();
    let names: Vec<String> = ops.iter().map(|op| op.address().to_string()).collect();
    assert_eq!(
        names,
        vec![
            "/subsystem=elytron",
            "/subsystem=elytron/kerberos-security-factory=web",
            "/subsystem=elytron/kerberos-security-factory=ejb",
        ]
    );
    assert_eq!(
        ops[1].parameter(REQUEST_LIFETIME),
        Some(&ModelNode::Expression("${krb.lifetime:3600}".to_string()))
    );
}

#[test]
fn test_indented_output() {
    let parser = SubsystemParser::default();
    let mut model = SubsystemModel::new(parser.address().clone());
    model
        .apply_all(&parse_file(data("minimal.xml"), parser.address()).unwrap())
        .unwrap();
    let xml = parser
        .write_to_string(model.node(), XmlWriterOptions { indent: Some(4) })
        .unwrap();
    let lines: Vec<&str> = xml.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "    <credential-security-factories>");
    assert!(lines[2].starts_with("        <kerberos-security-factory name=\"k1\""));
}

#[test]
fn test_json_model_written() {
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data("model.json")).unwrap()).unwrap();
    let node = ModelNode::try_from(&json).unwrap();
    let parser = SubsystemParser::default();
    let model = SubsystemModel::from_node(parser.address().clone(), node).unwrap();
    model.validate().unwrap();

    let xml = parser
        .write_to_string(model.node(), XmlWriterOptions::default())
        .unwrap();
    assert!(xml.contains(r#"server="false""#));
    assert!(xml.contains(r#"request-lifetime="${krb.lifetime:3600}""#));
    assert!(!xml.contains("debug="));

    let ops = parser.parse_str(&xml).unwrap();
    let mut rebuilt = SubsystemModel::new(parser.address().clone());
    rebuilt.apply_all(&ops).unwrap();
    assert_eq!(rebuilt.node(), model.node());
}

#[test]
fn test_json_model_order_kept() {
    let json: serde_json::Value = serde_json::from_str(
        r#"{"kerberos-security-factory": {
            "zeta": {"principal": "p", "path": "/z", "mechanism-oids": ["1.2"]},
            "alpha": {"principal": "p", "path": "/a", "mechanism-oids": ["1.2"]}
        }}"#,
    )
    .unwrap();
    let parser = SubsystemParser::default();
    let model =
        SubsystemModel::from_node(parser.address().clone(), ModelNode::try_from(&json).unwrap())
            .unwrap();
    model.validate().unwrap();

    let xml = parser
        .write_to_string(model.node(), XmlWriterOptions::default())
        .unwrap();
    let zeta = xml.find(r#"name="zeta""#).unwrap();
    let alpha = xml.find(r#"name="alpha""#).unwrap();
    assert!(zeta < alpha, "{xml}");
}

#[test]
fn test_json_model_scalar_resource_type_rejected() {
    let json: serde_json::Value =
        serde_json::from_str(r#"{"kerberos-security-factory": 5}"#).unwrap();
    let err = SubsystemModel::from_node(
        SubsystemParser::default().address().clone(),
        ModelNode::try_from(&json).unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Model(_)));
}
