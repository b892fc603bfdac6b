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

use taml_agents::{AgentError, TamlAgent, TamlAgentConfig};
use taml_core::{
    CustomNode, CustomNodeGroup, CustomValue, WriteNode, MAX_ATTRIBUTE_VALUE_LENGTH,
    MAX_NODE_FIELD_VALUE_LENGTH,
};
use taml_lanes::{DecodeError, EncodeError};

/// A level with a shared texture, a particle effect holding proxy objects and
/// structured custom data.
fn build_level() -> WriteNode {
    let texture = WriteNode::new("ImageAsset")
        .with_name("tiles")
        .with_ref_id(1)
        .with_field("ImageFile", "tiles.png")
        .with_field("CellCountX", "8");

    let hero = WriteNode::new("Sprite")
        .with_name("hero")
        .with_field("Position", "0 0")
        .with_child(WriteNode::reference("ImageAsset", 1).with_name("tiles"));

    let emitter = WriteNode::new("ParticleEmitter")
        .with_ref_id(2)
        .with_field("EmitterName", "sparks");

    let shapes = CustomNodeGroup::new("CollisionShapes")
        .with_node(
            CustomNode::new("Polygon")
                .with_field("Point", "0 0")
                .with_field("Point", "1 0")
                .with_child(CustomNode::new("Note").with_text("convex hull")),
        )
        .with_node(CustomNode::new("Circle").with_field("Radius", "0.5"));

    let emitters = CustomNodeGroup::new("Emitters").with_node(CustomNode::proxy(emitter));

    WriteNode::new("Scene")
        .with_name("level1")
        .with_field("Gravity", "0 -9.8")
        .with_child(texture)
        .with_child(hero)
        .with_custom_group(shapes)
        .with_custom_group(emitters)
}

#[test]
fn test_round_trip_rebuilds_the_original_tree() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let level = build_level();

    // --- 2. ACT ---
    let bytes = agent.save(&level).expect("Encoding should succeed");
    let graph = agent.load(&bytes).expect("Decoding should succeed");

    // --- 3. ASSERT ---
    assert_eq!(graph.to_write_node(), level);
    // Scene, texture, hero and the proxied emitter; the back-reference adds nothing.
    assert_eq!(graph.len(), 4);
}

#[test]
fn test_compressed_round_trip_matches_plain() {
    // --- 1. ARRANGE ---
    let plain_agent = TamlAgent::new();
    let packed_agent = TamlAgent::with_config(TamlAgentConfig::default().with_compression(true));
    let level = build_level();

    // --- 2. ACT ---
    let plain = plain_agent.save(&level).unwrap();
    let packed = packed_agent.save(&level).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(plain[8], 0, "Plain header must carry a cleared flag");
    assert_eq!(packed[8], 1, "Compressed header must carry a set flag");
    assert_eq!(&plain[..8], &packed[..8], "Signature and version are never compressed");
    // Either agent reads both payloads.
    assert_eq!(
        plain_agent.load(&packed).unwrap(),
        packed_agent.load(&plain).unwrap()
    );
}

#[test]
fn test_shared_object_decodes_once() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let level = build_level();

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&level).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let texture = graph.find_by_name("tiles").unwrap();
    let hero = graph.find_by_name("hero").unwrap();
    assert_eq!(graph.root_object().children[0], texture);
    assert_eq!(graph[hero].children, [texture]);
    assert_eq!(graph[texture].field("CellCountX"), Some("8"));
}

#[test]
fn test_reference_costs_only_a_header() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let heavy = WriteNode::new("ImageAsset")
        .with_ref_id(3)
        .with_field("ImageFile", "x".repeat(300));
    let once = WriteNode::new("Scene").with_child(heavy.clone());
    let twice = WriteNode::new("Scene")
        .with_child(heavy)
        .with_child(WriteNode::reference("ImageAsset", 3));

    // --- 2. ACT ---
    let once_len = agent.save(&once).unwrap().len();
    let twice_len = agent.save(&twice).unwrap().len();

    // --- 3. ASSERT ---
    // class name + NUL, empty name NUL, ref id, points-to id.
    assert_eq!(twice_len - once_len, "ImageAsset".len() + 1 + 1 + 4 + 4);
}

#[test]
fn test_ancestor_reference_forms_a_cycle() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let root = WriteNode::new("SceneWindow")
        .with_ref_id(1)
        .with_child(WriteNode::new("Camera").with_child(WriteNode::reference("SceneWindow", 1)));

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&root).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let camera = graph.root_object().children[0];
    assert_eq!(graph[camera].children, [graph.root()]);
    assert_eq!(graph.to_write_node(), root);
}

#[test]
fn test_sibling_reference_scenario() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let root = WriteNode::new("Scene")
        .with_child(WriteNode::new("ImageAsset").with_name("A").with_ref_id(7))
        .with_child(WriteNode::new("Sprite").with_name("B"))
        .with_child(WriteNode::reference("ImageAsset", 7));

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&root).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let children = &graph.root_object().children;
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], children[2]);
    assert_eq!(graph[children[0]].object_name.as_deref(), Some("A"));
    assert_eq!(graph[children[1]].object_name.as_deref(), Some("B"));
}

#[test]
fn test_attribute_order_and_duplicates_survive() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let root = WriteNode::new("Path")
        .with_field("Node", "0 0")
        .with_field("Speed", "2")
        .with_field("Node", "5 5")
        .with_field("Empty", "");

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&root).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let fields: Vec<_> = graph
        .root_object()
        .fields
        .iter()
        .map(|field| (field.name.as_str(), field.value.as_str()))
        .collect();
    assert_eq!(
        fields,
        [("Node", "0 0"), ("Speed", "2"), ("Node", "5 5"), ("Empty", "")]
    );
}

#[test]
fn test_long_values_are_truncated_not_rejected() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let attribute = "a".repeat(MAX_ATTRIBUTE_VALUE_LENGTH * 2);
    let custom = "b".repeat(MAX_NODE_FIELD_VALUE_LENGTH + 10);
    let root = WriteNode::new("Scene")
        .with_field("Script", attribute.clone())
        .with_custom_group(
            CustomNodeGroup::new("Data").with_node(
                CustomNode::new("Blob")
                    .with_text(custom.clone())
                    .with_field("Raw", custom.clone()),
            ),
        );

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&root).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let scene = graph.root_object();
    assert_eq!(scene.field("Script"), Some(&attribute[..MAX_ATTRIBUTE_VALUE_LENGTH]));
    let CustomValue::Node(blob) = &scene.custom_group("Data").unwrap().nodes[0] else {
        panic!("Blob should decode as a structural node");
    };
    assert_eq!(blob.text.as_deref(), Some(&custom[..MAX_NODE_FIELD_VALUE_LENGTH]));
    assert_eq!(blob.fields[0].value, custom[..MAX_NODE_FIELD_VALUE_LENGTH]);
}

#[test]
fn test_cuts_inside_a_character_keep_the_exact_prefix() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::with_config(TamlAgentConfig::default().with_compression(true));
    let attribute = format!("{}é{}", "a".repeat(MAX_ATTRIBUTE_VALUE_LENGTH - 1), "z".repeat(10));
    let custom = format!("{}é{}", "b".repeat(MAX_NODE_FIELD_VALUE_LENGTH - 1), "z".repeat(10));
    let root = WriteNode::new("Scene")
        .with_field("Script", attribute.clone())
        .with_custom_group(
            CustomNodeGroup::new("Data").with_node(
                CustomNode::new("Blob")
                    .with_text(custom.clone())
                    .with_field("Raw", custom.clone()),
            ),
        );

    // --- 2. ACT ---
    let graph = agent.load(&agent.save(&root).unwrap()).unwrap();

    // --- 3. ASSERT ---
    let scene = graph.root_object();
    assert_eq!(
        scene.field_bytes("Script"),
        Some(&attribute.as_bytes()[..MAX_ATTRIBUTE_VALUE_LENGTH])
    );
    let CustomValue::Node(blob) = &scene.custom_group("Data").unwrap().nodes[0] else {
        panic!("Blob should decode as a structural node");
    };
    let prefix = &custom.as_bytes()[..MAX_NODE_FIELD_VALUE_LENGTH];
    assert_eq!(blob.text.as_ref().map(|text| text.as_bytes()), Some(prefix));
    assert_eq!(blob.fields[0].value.as_bytes(), prefix);
    assert!(blob.fields[0].value.is_lossy());
}

#[test]
fn test_invalid_trees_are_rejected_before_writing() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let empty_class = WriteNode::new("Scene").with_child(WriteNode::new(""));
    let forward = WriteNode::new("Scene")
        .with_child(WriteNode::reference("ImageAsset", 9))
        .with_child(WriteNode::new("ImageAsset").with_ref_id(9));
    let mut sink = Vec::new();

    // --- 2. ACT ---
    let first = agent.save_to_writer(&empty_class, &mut sink);
    let second = agent.save_to_writer(&forward, &mut sink);

    // --- 3. ASSERT ---
    assert!(matches!(
        first,
        Err(AgentError::Encode(EncodeError::InvalidArgument(_)))
    ));
    assert!(matches!(
        second,
        Err(AgentError::Encode(EncodeError::InvalidArgument(_)))
    ));
    assert!(sink.is_empty(), "No byte may reach the sink for an invalid tree");
}

#[test]
fn test_truncated_payload_is_reported() {
    // --- 1. ARRANGE ---
    let agent = TamlAgent::new();
    let bytes = agent.save(&build_level()).unwrap();

    // --- 2. ACT ---
    let result = agent.load(&bytes[..bytes.len() - 3]);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(AgentError::Decode(DecodeError::Truncated))
    ));
}
