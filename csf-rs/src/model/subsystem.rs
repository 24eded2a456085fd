//! Subsystem subtree assembled from add operations.

use tracing::debug;

use crate::constants::ADD;
use crate::error::{Error, Result};
use crate::factory::FactoryVariant;

use super::{ModelNode, Operation, PathAddress};

/// The subsystem subtree: resource type -> name -> attributes.
///
/// Applying the operations produced by the reader to an empty
/// `SubsystemModel` rebuilds the subtree the writer consumes.
#[derive(Debug, Clone)]
pub struct SubsystemModel {
    address: PathAddress,
    root: ModelNode,
    added: bool,
}

impl SubsystemModel {
    /// Creates an empty subtree rooted at `address`.
    pub fn new(address: PathAddress) -> Self {
        SubsystemModel {
            address,
            root: ModelNode::object(),
            added: false,
        }
    }

    /// Wraps an existing subtree.
    pub fn from_node(address: PathAddress, root: ModelNode) -> Result<Self> {
        check_shape(&root)?;
        Ok(SubsystemModel {
            address,
            root,
            added: true,
        })
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn node(&self) -> &ModelNode {
        &self.root
    }

    pub fn into_node(self) -> ModelNode {
        self.root
    }

    /// Validates every resource of the subtree against its attribute
    /// definitions.
    pub fn validate(&self) -> Result<()> {
        check_shape(&self.root)?;
        for resource_type in self.root.keys() {
            let variant = FactoryVariant::from_resource_type(resource_type).ok_or_else(|| {
                Error::Model(format!("unknown resource type '{resource_type}'"))
            })?;
            let Some(resources) = self.root.get(resource_type).filter(|r| r.is_defined()) else {
                continue;
            };
            for name in resources.keys() {
                let address = self.address.append(resource_type, name);
                variant.validate(&address, resources.require(name)?)?;
            }
        }
        Ok(())
    }

    /// Applies every operation in order, stopping at the first failure.
    pub fn apply_all<'a, I>(&mut self, operations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Operation>,
    {
        for op in operations {
            self.apply(op)?;
        }
        Ok(())
    }

    /// Applies one `add` operation.
    ///
    /// Child resources are validated against their attribute definitions
    /// before insertion; names must be unique per resource type.
    pub fn apply(&mut self, op: &Operation) -> Result<()> {
        if op.name() != ADD {
            return Err(Error::Model(format!(
                "unsupported operation '{}' at {}",
                op.name(),
                op.address()
            )));
        }

        if op.address() == &self.address {
            if self.added {
                return Err(Error::DuplicateResource(op.address().to_string()));
            }
            self.added = true;
            return Ok(());
        }

        let element = match op.address().last() {
            Some(element) if op.address().is_child_of(&self.address) => element,
            _ => {
                return Err(Error::Model(format!(
                    "{} is not a child of {}",
                    op.address(),
                    self.address
                )))
            }
        };

        let variant = FactoryVariant::from_resource_type(&element.key).ok_or_else(|| {
            Error::Model(format!("unknown resource type '{}'", element.key))
        })?;
        variant.validate(op.address(), op.parameters())?;

        let resources = self.root.get_mut(&element.key);
        if resources.is_defined() && resources.as_object().is_none() {
            return Err(not_an_object(&element.key, resources));
        }
        if resources.has_defined(&element.value) {
            return Err(Error::DuplicateResource(op.address().to_string()));
        }
        resources.set(&element.value, op.parameters().clone());
        debug!(address = %op.address(), "resource added");
        Ok(())
    }
}

/// The root and every defined resource-type entry must be objects.
fn check_shape(root: &ModelNode) -> Result<()> {
    if root.is_defined() && root.as_object().is_none() {
        return Err(Error::Model(format!(
            "subsystem model must be an object, got {root}"
        )));
    }
    for resource_type in root.keys() {
        match root.get(resource_type) {
            Some(resources) if resources.is_defined() && resources.as_object().is_none() => {
                return Err(not_an_object(resource_type, resources));
            }
            _ => {}
        }
    }
    Ok(())
}

fn not_an_object(resource_type: &str, resources: &ModelNode) -> Error {
    Error::Model(format!(
        "'{resource_type}' must be an object of named resources, got {resources}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KERBEROS_SECURITY_FACTORY, MECHANISM_OIDS, PATH, PRINCIPAL};

    fn subsystem() -> PathAddress {
        PathAddress::root().append("subsystem", "elytron")
    }

    fn kerberos_add(name: &str, oids: &[&str]) -> Operation {
        let mut op = Operation::add(subsystem().append(KERBEROS_SECURITY_FACTORY, name));
        let params = op.parameters_mut();
        params.set(PRINCIPAL, "HTTP/host@R".into());
        params.set(PATH, "/etc/kt".into());
        let list = params.get_mut(MECHANISM_OIDS);
        *list = ModelNode::List(Vec::new());
        for oid in oids {
            list.add((*oid).into());
        }
        op
    }

    #[test]
    fn test_apply_builds_subtree() {
        let mut model = SubsystemModel::new(subsystem());
        model
            .apply_all(&[
                Operation::add(subsystem()),
                kerberos_add("k1", &["1.2.840.113554.1.2.2"]),
                kerberos_add("k2", &["1.3.6.1.5.5.2"]),
            ])
            .unwrap();
        let factories = model.node().get(KERBEROS_SECURITY_FACTORY).unwrap();
        let names: Vec<&str> = factories.keys().collect();
        assert_eq!(names, vec!["k1", "k2"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut model = SubsystemModel::new(subsystem());
        model.apply(&kerberos_add("k1", &["1.2.3"])).unwrap();
        let err = model.apply(&kerberos_add("k1", &["1.2.3"])).unwrap_err();
        assert!(matches!(err, Error::DuplicateResource(_)));
    }

    #[test]
    fn test_empty_mechanism_oids_rejected_by_validator() {
        let mut model = SubsystemModel::new(subsystem());
        let err = model.apply(&kerberos_add("k1", &[])).unwrap_err();
        assert!(matches!(err, Error::Validation { ref attribute, .. } if attribute == MECHANISM_OIDS));
    }

    #[test]
    fn test_validate_wrapped_subtree() {
        let mut built = SubsystemModel::new(subsystem());
        built.apply(&kerberos_add("k1", &["1.2.3"])).unwrap();
        let mut root = built.into_node();
        let wrapped = SubsystemModel::from_node(subsystem(), root.clone()).unwrap();
        wrapped.validate().unwrap();

        root.get_mut(KERBEROS_SECURITY_FACTORY)
            .get_mut("k1")
            .set(MECHANISM_OIDS, ModelNode::List(Vec::new()));
        let wrapped = SubsystemModel::from_node(subsystem(), root).unwrap();
        assert!(matches!(wrapped.validate(), Err(Error::Validation { .. })));

        let mut unknown = ModelNode::object();
        unknown.get_mut("jwt-factory").set("j", ModelNode::object());
        let wrapped = SubsystemModel::from_node(subsystem(), unknown).unwrap();
        assert!(matches!(wrapped.validate(), Err(Error::Model(_))));
    }

    #[test]
    fn test_resource_type_must_be_object() {
        let mut root = ModelNode::object();
        root.set(KERBEROS_SECURITY_FACTORY, 5.into());
        let err = SubsystemModel::from_node(subsystem(), root).unwrap_err();
        assert!(matches!(err, Error::Model(ref message) if message.contains(KERBEROS_SECURITY_FACTORY)));

        let mut root = ModelNode::object();
        root.set(KERBEROS_SECURITY_FACTORY, ModelNode::List(Vec::new()));
        assert!(matches!(
            SubsystemModel::from_node(subsystem(), root),
            Err(Error::Model(_))
        ));
    }

    #[test]
    fn test_apply_into_scalar_resource_type_fails() {
        let mut model = SubsystemModel::new(subsystem());
        model.root.set(KERBEROS_SECURITY_FACTORY, 5.into());
        assert!(matches!(model.validate(), Err(Error::Model(_))));
        let err = model.apply(&kerberos_add("k", &["1.2.3"])).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
        assert_eq!(model.node().get(KERBEROS_SECURITY_FACTORY), Some(&ModelNode::Int(5)));
    }

    #[test]
    fn test_undefined_resource_type_tolerated() {
        let mut root = ModelNode::object();
        root.set(KERBEROS_SECURITY_FACTORY, ModelNode::Undefined);
        let mut model = SubsystemModel::from_node(subsystem(), root).unwrap();
        model.validate().unwrap();
        model.apply(&kerberos_add("k", &["1.2.3"])).unwrap();
        assert!(model.node().has_defined(KERBEROS_SECURITY_FACTORY));
    }

    #[test]
    fn test_foreign_address_rejected() {
        let mut model = SubsystemModel::new(subsystem());
        let op = Operation::add(PathAddress::root().append("subsystem", "other").append(
            KERBEROS_SECURITY_FACTORY,
            "k1",
        ));
        assert!(matches!(model.apply(&op), Err(Error::Model(_))));
    }
}
