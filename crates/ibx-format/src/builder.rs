//! Conversion between IBX1 documents and element trees.
//!
//! [`DocumentBuilder`] interns an [`Element`] tree into string and value
//! tables; [`Document::to_element`] resolves a document back into one.

use crate::{
    BuildOptions, Document, Element, Error, Node, Property, PropertyEntry, RenderOptions, Result,
    StringTable, ValueTable, MAX_DEPTH,
};

/// Builder for constructing IBX1 documents from element trees.
///
/// Tables fill in the walk order the game files use: an element's name,
/// then its child elements, then its own property names and values. The
/// encoded node still lists properties before children.
///
/// # Example
///
/// ```
/// use ibx_format::{BuildOptions, DocumentBuilder, Element, ValueKind};
///
/// let root = Element::new("Root")
///     .property("Root", ValueKind::Bool, "true");
///
/// let document = DocumentBuilder::new(&BuildOptions::default()).build(&root)?;
/// assert_eq!(document.strings(), &["Root".to_string()]);
/// # Ok::<(), ibx_format::Error>(())
/// ```
#[derive(Debug)]
pub struct DocumentBuilder {
    strings: StringTable,
    values: ValueTable,
}

impl DocumentBuilder {
    /// Create a builder with empty tables.
    pub fn new(options: &BuildOptions) -> Self {
        Self {
            strings: StringTable::new(),
            values: ValueTable::new(options.share_values),
        }
    }

    /// Build the document rooted at `root`.
    ///
    /// Fails on the first property whose value does not parse for its type.
    pub fn build(mut self, root: &Element) -> Result<Document> {
        let node = self.build_node(root)?;
        log::debug!(
            "built document: {} strings, {} typed values, {} nodes",
            self.strings.len(),
            self.values.len(),
            node.count()
        );
        Ok(Document::from_parts(
            self.strings.into_vec(),
            self.values.into_vec(),
            node,
        ))
    }

    fn build_node(&mut self, root: &Element) -> Result<Node> {
        let name = self.strings.intern(&root.name)?;
        let mut current = Pending::new(root, name);
        let mut ancestors: Vec<Pending<'_>> = Vec::new();

        loop {
            let element = current.element;

            if let Some(child) = element.children.get(current.next_child) {
                current.next_child += 1;
                if ancestors.len() + 1 >= MAX_DEPTH {
                    return Err(Error::NestingTooDeep { max: MAX_DEPTH });
                }
                let name = self.strings.intern(&child.name)?;
                ancestors.push(std::mem::replace(&mut current, Pending::new(child, name)));
                continue;
            }

            // children are done, the element's own properties come next
            let mut properties = Vec::with_capacity(element.properties.len());
            for entry in &element.properties {
                let name = self.strings.intern(&entry.name)?;
                let value = self.values.intern(entry.kind, &entry.value, &mut self.strings)?;
                properties.push(Property::new(name, value));
            }

            let node = Node {
                name: current.name,
                properties,
                children: current.children,
            };
            match ancestors.pop() {
                Some(parent) => {
                    current = parent;
                    current.children.push(node);
                }
                None => return Ok(node),
            }
        }
    }
}

/// An element whose children are still being built.
struct Pending<'a> {
    element: &'a Element,
    name: u32,
    next_child: usize,
    children: Vec<Node>,
}

impl<'a> Pending<'a> {
    fn new(element: &'a Element, name: u32) -> Self {
        Self {
            element,
            name,
            next_child: 0,
            children: Vec::with_capacity(element.children.len()),
        }
    }
}

/// A node whose children are still being resolved.
struct Resolving<'a> {
    node: &'a Node,
    next_child: usize,
    element: Element,
}

impl Document {
    /// Build a document from an element tree.
    pub fn from_element(root: &Element, options: &BuildOptions) -> Result<Self> {
        DocumentBuilder::new(options).build(root)
    }

    /// Resolve the document into an element tree, rendering each value.
    pub fn to_element(&self, options: &RenderOptions) -> Result<Element> {
        let root = self.root();
        let mut current = Resolving {
            node: root,
            next_child: 0,
            element: self.element_shell(root, options)?,
        };
        let mut ancestors: Vec<Resolving<'_>> = Vec::new();

        loop {
            let node = current.node;

            if let Some(child) = node.children.get(current.next_child) {
                current.next_child += 1;
                let next = Resolving {
                    node: child,
                    next_child: 0,
                    element: self.element_shell(child, options)?,
                };
                ancestors.push(std::mem::replace(&mut current, next));
                continue;
            }

            let element = current.element;
            match ancestors.pop() {
                Some(parent) => {
                    current = parent;
                    current.element.children.push(element);
                }
                None => return Ok(element),
            }
        }
    }

    /// The element for `node` with its properties resolved and no children yet.
    fn element_shell(&self, node: &Node, options: &RenderOptions) -> Result<Element> {
        let mut properties = Vec::with_capacity(node.properties.len());
        for property in &node.properties {
            let (kind, value) = self.value(property.value)?.render(self.strings(), options)?;
            properties.push(PropertyEntry {
                name: self.string(property.name)?.to_string(),
                kind,
                value,
            });
        }

        Ok(Element {
            name: self.string(node.name)?.to_string(),
            properties,
            children: Vec::with_capacity(node.children.len()),
        })
    }
}
