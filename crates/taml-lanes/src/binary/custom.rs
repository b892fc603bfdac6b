// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Encoding and decoding of custom node groups.
//!
//! The custom block has two levels. A top-level group writes only its name and
//! member count; each member then goes through the recursive custom node
//! encoding:
//!
//! ```text
//! CustomNode := IsProxy:bool
//!             | true  -> Element
//!             | false -> Name Text[MAX_NODE_FIELD_VALUE_LENGTH]
//!                        ChildCount:u32 CustomNode*
//!                        FieldCount:u32 (Name Value)*
//! ```
//!
//! A node's own text value is fixed-width and zero-padded while its field
//! values are variable-length with the same cap. Readers depend on both
//! conventions.

use crate::binary::reader::ElementDecoder;
use crate::binary::wire::{
    bounded, read_bool, read_fixed, read_str, read_text, read_u32, write_bool, write_count,
    write_fixed, write_str,
};
use crate::binary::writer::ElementEncoder;
use crate::strategies::{DecodeError, EncodeError};
use std::io::{BufRead, Write};
use taml_core::{
    CustomGroup, CustomNode, CustomValue, DecodedCustomNode, Field, WriteNode,
    MAX_NODE_FIELD_VALUE_LENGTH,
};

impl<W: Write + ?Sized> ElementEncoder<'_, W> {
    pub(crate) fn write_custom_elements(&mut self, node: &WriteNode) -> Result<(), EncodeError> {
        let groups = node.custom_nodes.groups();
        write_count(self.stream, groups.len())?;

        for group in groups {
            write_str(self.stream, &group.name, None)?;
            write_count(self.stream, group.nodes.len())?;
            for custom in &group.nodes {
                self.write_custom_node(custom)?;
            }
        }
        Ok(())
    }

    fn write_custom_node(&mut self, node: &CustomNode) -> Result<(), EncodeError> {
        if let Some(proxy) = node.proxy_write_node() {
            write_bool(self.stream, true)?;
            return self.write_element(proxy);
        }

        write_bool(self.stream, false)?;
        write_str(self.stream, &node.name, None)?;
        write_fixed(
            self.stream,
            node.text_value.as_deref(),
            MAX_NODE_FIELD_VALUE_LENGTH,
        )?;

        write_count(self.stream, node.children.len())?;
        for child in &node.children {
            self.write_custom_node(child)?;
        }

        write_count(self.stream, node.fields.len())?;
        for field in &node.fields {
            write_str(self.stream, &field.name, None)?;
            write_str(self.stream, &field.value, Some(MAX_NODE_FIELD_VALUE_LENGTH))?;
        }
        Ok(())
    }
}

impl<R: BufRead> ElementDecoder<R> {
    pub(crate) fn read_custom_elements(&mut self) -> Result<Vec<CustomGroup>, DecodeError> {
        let group_count = read_u32(&mut self.stream)?;
        let mut groups = Vec::with_capacity(bounded(group_count));

        for _ in 0..group_count {
            let name = read_str(&mut self.stream)?;
            let member_count = read_u32(&mut self.stream)?;
            let mut nodes = Vec::with_capacity(bounded(member_count));
            for _ in 0..member_count {
                nodes.push(self.read_custom_node()?);
            }
            groups.push(CustomGroup { name, nodes });
        }
        Ok(groups)
    }

    fn read_custom_node(&mut self) -> Result<CustomValue, DecodeError> {
        self.enter()?;
        let node = self.read_custom_node_body();
        self.leave();
        node
    }

    fn read_custom_node_body(&mut self) -> Result<CustomValue, DecodeError> {
        if read_bool(&mut self.stream)? {
            let object = self.read_element()?;
            return Ok(CustomValue::Proxy { object });
        }

        let name = read_str(&mut self.stream)?;
        let text = read_fixed(&mut self.stream, MAX_NODE_FIELD_VALUE_LENGTH)?;

        let child_count = read_u32(&mut self.stream)?;
        let mut children = Vec::with_capacity(bounded(child_count));
        for _ in 0..child_count {
            children.push(self.read_custom_node()?);
        }

        let field_count = read_u32(&mut self.stream)?;
        let mut fields = Vec::with_capacity(bounded(field_count));
        for _ in 0..field_count {
            let name = read_str(&mut self.stream)?;
            let value = read_text(&mut self.stream)?;
            fields.push(Field { name, value });
        }

        Ok(CustomValue::Node(DecodedCustomNode {
            name,
            text,
            children,
            fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{TamlBinaryReader, TamlBinaryWriter, MAX_NESTING_DEPTH};
    use taml_core::{CustomNodeGroup, TamlHeader};

    fn encode(root: &WriteNode) -> Vec<u8> {
        let mut out = Vec::new();
        TamlBinaryWriter::new().write(&mut out, root, false).unwrap();
        out
    }

    fn element_bytes(root: &WriteNode) -> Vec<u8> {
        encode(root)[TamlHeader::SIZE..].to_vec()
    }

    #[test]
    fn text_value_is_always_fixed_width() {
        let short = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Shapes").with_node(CustomNode::new("Circle").with_text("1")),
        );
        let empty = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Shapes").with_node(CustomNode::new("Circle")),
        );
        let long = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Shapes").with_node(
                CustomNode::new("Circle").with_text("x".repeat(MAX_NODE_FIELD_VALUE_LENGTH * 2)),
            ),
        );

        let size = encode(&short).len();
        assert_eq!(encode(&empty).len(), size);
        assert_eq!(encode(&long).len(), size);
    }

    #[test]
    fn custom_node_layout() {
        let root = WriteNode::new("S").with_custom_group(
            CustomNodeGroup::new("G").with_node(
                CustomNode::new("N")
                    .with_text("t")
                    .with_field("k", "v"),
            ),
        );
        let bytes = element_bytes(&root);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"S\0\0");
        expected.extend_from_slice(&[0u8; 16]); // ref id, points-to, attributes, children
        expected.extend_from_slice(&1u32.to_le_bytes()); // groups
        expected.extend_from_slice(b"G\0");
        expected.extend_from_slice(&1u32.to_le_bytes()); // members
        expected.push(0); // not a proxy
        expected.extend_from_slice(b"N\0");
        let mut text = vec![0u8; MAX_NODE_FIELD_VALUE_LENGTH];
        text[0] = b't';
        expected.extend_from_slice(&text);
        expected.extend_from_slice(&0u32.to_le_bytes()); // children
        expected.extend_from_slice(&1u32.to_le_bytes()); // fields
        expected.extend_from_slice(b"k\0v\0");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn field_values_are_capped_not_padded() {
        let long_value = "v".repeat(MAX_NODE_FIELD_VALUE_LENGTH + 100);
        let root = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Data").with_node(CustomNode::new("Entry").with_field("blob", long_value)),
        );

        let graph = TamlBinaryReader::new().read_bytes(&encode(&root)).unwrap();
        let CustomValue::Node(node) = &graph.root_object().custom_nodes[0].nodes[0] else {
            panic!("expected a structural node");
        };
        assert_eq!(node.fields[0].value.len(), MAX_NODE_FIELD_VALUE_LENGTH);

        let short = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Data").with_node(CustomNode::new("Entry").with_field("blob", "v")),
        );
        let short_len = encode(&short).len();
        let long_len = encode(&root).len();
        assert_eq!(long_len - short_len, MAX_NODE_FIELD_VALUE_LENGTH - 1);
    }

    #[test]
    fn proxy_is_an_ordinary_element_record() {
        let emitter = WriteNode::new("ParticleAssetEmitter")
            .with_name("smoke")
            .with_field("EmitterType", "POINT");
        let via_proxy = WriteNode::new("ParticleAsset").with_custom_group(
            CustomNodeGroup::new("Emitters").with_node(CustomNode::proxy(emitter.clone())),
        );

        let bytes = element_bytes(&via_proxy);
        let emitter_bytes = element_bytes(&emitter);
        // group name + member count + proxy flag precede the nested element.
        assert!(bytes.ends_with(&emitter_bytes));
        assert_eq!(bytes[bytes.len() - emitter_bytes.len() - 1], 1);
    }

    #[test]
    fn nested_custom_tree_round_trips() {
        let root = WriteNode::new("CompositeSprite").with_custom_group(
            CustomNodeGroup::new("Sprites")
                .with_node(
                    CustomNode::new("Sprite")
                        .with_field("LogicalPosition", "0 0")
                        .with_child(CustomNode::new("Frame").with_text("3")),
                )
                .with_node(CustomNode::new("Sprite").with_field("LogicalPosition", "1 0")),
        );

        let graph = TamlBinaryReader::new().read_bytes(&encode(&root)).unwrap();
        let group = graph.root_object().custom_group("Sprites").unwrap();
        assert_eq!(group.nodes.len(), 2);

        let CustomValue::Node(first) = &group.nodes[0] else {
            panic!("expected a structural node");
        };
        assert_eq!(first.text, None);
        assert_eq!(first.fields, vec![Field::new("LogicalPosition", "0 0")]);
        let CustomValue::Node(frame) = &first.children[0] else {
            panic!("expected a structural node");
        };
        assert_eq!(frame.name, "Frame");
        assert_eq!(frame.text.as_deref(), Some("3"));
    }

    #[test]
    fn empty_text_reads_back_as_absent() {
        let root = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Shapes").with_node(CustomNode::new("Circle").with_text("")),
        );

        let graph = TamlBinaryReader::new().read_bytes(&encode(&root)).unwrap();
        let CustomValue::Node(circle) = &graph.root_object().custom_nodes[0].nodes[0] else {
            panic!("expected a structural node");
        };
        assert_eq!(circle.text, None);
    }

    #[test]
    fn deeply_nested_custom_nodes_are_rejected() {
        let mut bytes = TamlHeader::default().to_bytes().to_vec();
        bytes.extend_from_slice(b"S\0\0");
        bytes.extend_from_slice(&[0u8; 16]); // ref id, points-to, attributes, children
        bytes.extend_from_slice(&1u32.to_le_bytes()); // groups
        bytes.extend_from_slice(b"G\0");
        bytes.extend_from_slice(&1u32.to_le_bytes()); // members
        for _ in 0..MAX_NESTING_DEPTH + 10 {
            bytes.push(0); // not a proxy
            bytes.extend_from_slice(b"N\0");
            bytes.extend_from_slice(&[0u8; MAX_NODE_FIELD_VALUE_LENGTH]);
            bytes.extend_from_slice(&1u32.to_le_bytes()); // one child
        }

        let result = TamlBinaryReader::new().read_bytes(&bytes);
        assert!(matches!(
            result,
            Err(DecodeError::NestingTooDeep(MAX_NESTING_DEPTH))
        ));
    }

    #[test]
    fn custom_values_keep_bytes_of_split_characters() {
        // "é" straddles the cap in both the text and the field value.
        let value = format!("{}é{}", "b".repeat(MAX_NODE_FIELD_VALUE_LENGTH - 1), "z".repeat(10));
        let root = WriteNode::new("Scene").with_custom_group(
            CustomNodeGroup::new("Data").with_node(
                CustomNode::new("Entry")
                    .with_text(value.clone())
                    .with_field("blob", value.clone()),
            ),
        );

        let graph = TamlBinaryReader::new().read_bytes(&encode(&root)).unwrap();
        let CustomValue::Node(entry) = &graph.root_object().custom_nodes[0].nodes[0] else {
            panic!("expected a structural node");
        };
        let expected = &value.as_bytes()[..MAX_NODE_FIELD_VALUE_LENGTH];
        assert_eq!(entry.fields[0].value.as_bytes(), expected);
        assert_eq!(entry.text.as_ref().map(|text| text.as_bytes()), Some(expected));
        assert!(entry.fields[0].value.is_lossy());
    }
}
