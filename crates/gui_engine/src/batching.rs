//! Geometry batching
//!
//! Rebuilds the cached meshes of a render target whenever one of its widgets
//! is dirty. Render sub-elements are walked far-to-near and greedily merged
//! into material groups. A quad may join a group only if no other group has
//! geometry both within the depth span the merge would cover and overlapping
//! the union of the quad's and the group's bounds, which keeps paint order
//! correct after batching. Groups paint in the order their farthest member
//! would have painted.

use log::warn;

use crate::foundation::collections::{ElementId, TargetId, WidgetId};
use crate::foundation::math::{RectI, Vec4};
use crate::manager::GuiManager;
use crate::render::{MaterialKey, MeshData, MeshPool, SpriteMaterialInfo};

struct BatchEntry {
    element: ElementId,
    widget: WidgetId,
    sub: u32,
    depth: u32,
    bounds: RectI,
}

struct BatchGroup {
    key: MaterialKey,
    material: SpriteMaterialInfo,
    /// Owning widget, or `None` once entries from several widgets merged
    widget: Option<WidgetId>,
    /// Depth of the farthest member, fixed at creation; decides paint order
    depth: u32,
    min_depth: u32,
    bounds: RectI,
    entries: Vec<usize>,
}

impl GuiManager {
    /// Rebuild cached meshes for every render target with a dirty widget
    ///
    /// Group assignment is quadratic in the number of groups per insertion;
    /// GUI scenes are small enough that a spatial index has not paid off.
    pub(crate) fn update_meshes(&mut self, pool: &mut dyn MeshPool) {
        let targets: Vec<TargetId> = self.render_data.keys().copied().collect();
        for target in targets {
            let Some(data) = self.render_data.get(&target) else {
                continue;
            };
            let needs_rebuild = data.dirty
                || data
                    .widgets
                    .iter()
                    .any(|&w| self.widgets.get(w).map_or(false, |w| w.dirty));
            if !needs_rebuild {
                continue;
            }
            self.rebuild_target_meshes(target, pool);
            self.core_dirty = true;
        }
        for (_, widget) in self.widgets.iter_mut() {
            widget.dirty = false;
        }
    }

    fn rebuild_target_meshes(&mut self, target: TargetId, pool: &mut dyn MeshPool) {
        let Some(widgets) = self.render_data.get(&target).map(|d| d.widgets.clone()) else {
            return;
        };

        // gather render sub-elements with window-space bounds
        let mut entries: Vec<BatchEntry> = Vec::new();
        for &widget_id in &widgets {
            let Some(widget) = self.widgets.get(widget_id) else {
                continue;
            };
            let transform = *widget.world_transform();
            for &element_id in widget.elements() {
                let Some(entry) = self.elements.get(element_id) else {
                    continue;
                };
                if entry.destroyed || !entry.element.is_visible() {
                    continue;
                }
                for sub in 0..entry.element.num_render_elements() {
                    if entry.element.num_quads(sub) == 0 {
                        continue;
                    }
                    entries.push(BatchEntry {
                        element: element_id,
                        widget: widget_id,
                        sub,
                        depth: entry.element.render_element_depth(sub),
                        bounds: entry.element.clipped_bounds().transform(&transform),
                    });
                }
            }
        }

        // far-to-near: higher depth paints first
        entries.sort_by(|a, b| {
            b.depth
                .cmp(&a.depth)
                .then_with(|| b.element.cmp(&a.element))
                .then_with(|| b.sub.cmp(&a.sub))
        });

        let separate_by_widget = self.config.separate_meshes_by_widget;
        let mut groups: Vec<BatchGroup> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            let Some(element) = self.elements.get(entry.element) else {
                continue;
            };
            let material = element.element.material(entry.sub);
            let key = material.key();

            let mut chosen = None;
            for gi in (0..groups.len()).rev() {
                let group = &groups[gi];
                if group.key != key {
                    continue;
                }
                if separate_by_widget && group.widget != Some(entry.widget) {
                    continue;
                }
                if group.depth == entry.depth {
                    chosen = Some(gi);
                    break;
                }

                // merging pulls this quad back to the group's paint position,
                // which is safe only if nothing painted in between overlaps
                // the combined bounds
                let mut union = group.bounds;
                union.encapsulate(&entry.bounds);
                let start = entry.depth;
                let end = group.depth;
                let blocked = groups.iter().enumerate().any(|(oi, other)| {
                    oi != gi
                        && ((other.min_depth >= start && other.min_depth <= end)
                            || (other.depth >= start && other.depth <= end))
                        && other.bounds.overlaps(&union)
                });
                if !blocked {
                    chosen = Some(gi);
                    break;
                }
            }

            match chosen {
                Some(gi) => {
                    let group = &mut groups[gi];
                    group.entries.push(idx);
                    group.min_depth = group.min_depth.min(entry.depth);
                    group.bounds.encapsulate(&entry.bounds);
                    if group.widget != Some(entry.widget) {
                        group.widget = None;
                    }
                }
                None => groups.push(BatchGroup {
                    key,
                    material,
                    widget: Some(entry.widget),
                    depth: entry.depth,
                    min_depth: entry.depth,
                    bounds: entry.bounds,
                    entries: vec![idx],
                }),
            }
        }

        log::debug!(
            "rebatched render target: {} sub-elements into {} groups",
            entries.len(),
            groups.len()
        );

        // paint groups far-to-near by creation depth
        let mut order: Vec<usize> = (0..groups.len()).collect();
        order.sort_by(|&a, &b| {
            groups[b]
                .depth
                .cmp(&groups[a].depth)
                .then_with(|| a.cmp(&b))
        });

        if let Some(data) = self.render_data.get_mut(&target) {
            data.release_meshes(pool);
            data.dirty = false;
        }

        let mut new_meshes = Vec::new();
        let mut new_materials = Vec::new();
        let mut new_widgets = Vec::new();

        for &gi in &order {
            let group = &groups[gi];
            let total_quads: u32 = group
                .entries
                .iter()
                .map(|&i| {
                    let e = &entries[i];
                    self.elements
                        .get(e.element)
                        .map_or(0, |el| el.element.num_quads(e.sub))
                })
                .sum();
            if total_quads == 0 {
                continue;
            }

            let mut mesh = MeshData::with_quads(total_quads);
            let mut quad_offset = 0u32;
            for &i in &group.entries {
                let e = &entries[i];
                let Some(element) = self.elements.get(e.element) else {
                    continue;
                };
                let num_quads = element.element.num_quads(e.sub);
                element.element.fill_buffer(
                    &mut mesh.vertices,
                    &mut mesh.indices,
                    quad_offset,
                    total_quads,
                    e.sub,
                );

                // rebase element-local indices into the shared mesh
                let base_vertex = quad_offset * 4;
                let index_range = (quad_offset * 6) as usize..((quad_offset + num_quads) * 6) as usize;
                for index in &mut mesh.indices[index_range] {
                    *index += base_vertex;
                }

                // mixed-widget batches bake widget transforms into vertices
                if group.widget.is_none() {
                    if let Some(widget) = self.widgets.get(e.widget) {
                        let transform = widget.world_transform();
                        let vertex_range =
                            (quad_offset * 4) as usize..((quad_offset + num_quads) * 4) as usize;
                        for vertex in &mut mesh.vertices[vertex_range] {
                            let p = transform
                                * Vec4::new(vertex.position[0], vertex.position[1], 0.0, 1.0);
                            vertex.position = [p.x, p.y];
                        }
                    }
                }

                quad_offset += num_quads;
            }

            let handle = pool.allocate(mesh);
            if handle.is_none() {
                warn!("mesh pool allocation failed, skipping one GUI batch this frame");
            }
            new_meshes.push(handle);
            new_materials.push(group.material);
            new_widgets.push(group.widget);
        }

        if let Some(data) = self.render_data.get_mut(&target) {
            data.cached_meshes = new_meshes;
            data.cached_materials = new_materials;
            data.cached_widgets_per_mesh = new_widgets;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuiConfig;
    use crate::platform::WindowId;
    use crate::render::{CameraId, Color, SpriteMaterial, TextureId};
    use crate::test_util::{single_window_harness, Harness, TestElement};

    fn textured(texture: u64) -> SpriteMaterialInfo {
        SpriteMaterialInfo {
            kind: SpriteMaterial::Image,
            texture: Some(TextureId(texture)),
            tint: Color::WHITE,
        }
    }

    fn quad_element(
        harness: &Harness,
        label: &'static str,
        depth: u32,
        bounds: RectI,
        material: SpriteMaterialInfo,
    ) -> TestElement {
        let mut element = TestElement::new(label, depth, bounds, &harness.log);
        element.script.render = vec![(depth, material, 1)];
        element
    }

    fn snapshot_textures(harness: &mut Harness) -> Vec<u64> {
        let snapshot = harness.update(0.016).expect("batches were rebuilt");
        snapshot.per_camera[&CameraId(1)]
            .iter()
            .map(|entry| entry.texture.0)
            .collect()
    }

    #[test]
    fn test_same_material_merges_into_one_mesh() {
        let (mut harness, widget) = single_window_harness();
        let far = quad_element(&harness, "far", 9, RectI::new(0, 0, 50, 50), textured(1));
        let near = quad_element(&harness, "near", 5, RectI::new(100, 0, 50, 50), textured(1));
        harness.add_scripted(widget, far);
        harness.add_scripted(widget, near);

        assert_eq!(snapshot_textures(&mut harness), vec![1]);
        assert_eq!(harness.pool.live.len(), 1);

        let mesh = harness.pool.uploads.values().next().unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(
            mesh.indices,
            vec![0, 1, 2, 2, 1, 3, 4, 5, 6, 6, 5, 7],
            "second element's indices are rebased past the first's vertices"
        );
        // far element paints first
        assert!((mesh.vertices[0].position[0] - 0.0).abs() < f32::EPSILON);
        assert!((mesh.vertices[4].position[0] - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overlapping_intervening_material_splits_batches() {
        let (mut harness, widget) = single_window_harness();
        let far = quad_element(&harness, "far", 9, RectI::new(0, 0, 50, 50), textured(1));
        let mid = quad_element(&harness, "mid", 7, RectI::new(10, 10, 50, 50), textured(2));
        let near = quad_element(&harness, "near", 5, RectI::new(20, 20, 50, 50), textured(1));
        harness.add_scripted(widget, far);
        harness.add_scripted(widget, mid);
        harness.add_scripted(widget, near);

        assert_eq!(snapshot_textures(&mut harness), vec![1, 2, 1]);
        assert_eq!(harness.pool.live.len(), 3);
    }

    #[test]
    fn test_non_overlapping_intervening_material_still_merges() {
        let (mut harness, widget) = single_window_harness();
        let far = quad_element(&harness, "far", 9, RectI::new(0, 0, 50, 50), textured(1));
        let mid = quad_element(&harness, "mid", 7, RectI::new(200, 200, 50, 50), textured(2));
        let near = quad_element(&harness, "near", 5, RectI::new(10, 10, 40, 40), textured(1));
        harness.add_scripted(widget, far);
        harness.add_scripted(widget, mid);
        harness.add_scripted(widget, near);

        // the shared-texture quads never overlap the other batch, so they
        // merge and paint at the far quad's position
        assert_eq!(snapshot_textures(&mut harness), vec![1, 2]);
        assert_eq!(harness.pool.live.len(), 2);
    }

    #[test]
    fn test_merge_union_bounds_block_distant_same_material_quads() {
        let (mut harness, widget) = single_window_harness();
        let far = quad_element(&harness, "far", 9, RectI::new(0, 0, 50, 50), textured(1));
        let mid = quad_element(&harness, "mid", 7, RectI::new(10, 10, 50, 50), textured(2));
        let near = quad_element(&harness, "near", 5, RectI::new(400, 0, 50, 50), textured(1));
        harness.add_scripted(widget, far);
        harness.add_scripted(widget, mid);
        harness.add_scripted(widget, near);

        // the near quad is clear of the mid quad, but pulling it back next to
        // the far quad would span bounds the mid quad overlaps
        assert_eq!(snapshot_textures(&mut harness), vec![1, 2, 1]);
        assert_eq!(harness.pool.live.len(), 3);
    }

    #[test]
    fn test_widgets_batch_separately_by_default() {
        let (mut harness, widget_a) = single_window_harness();
        let target = harness.manager.widget(widget_a).unwrap().target();
        let widget_b = harness.add_widget(target, RectI::new(0, 0, 800, 600));

        let a = quad_element(&harness, "a", 9, RectI::new(0, 0, 50, 50), textured(1));
        let b = quad_element(&harness, "b", 5, RectI::new(100, 0, 50, 50), textured(1));
        harness.add_scripted(widget_a, a);
        harness.add_scripted(widget_b, b);

        assert_eq!(snapshot_textures(&mut harness), vec![1, 1]);
        assert_eq!(harness.pool.live.len(), 2);
    }

    #[test]
    fn test_widgets_share_batches_when_configured() {
        let mut harness = Harness::new();
        harness.manager = crate::manager::GuiManager::with_config(GuiConfig {
            separate_meshes_by_widget: false,
            ..GuiConfig::default()
        });
        let target = harness.add_window(WindowId(1), RectI::new(0, 0, 800, 600));
        let widget_a = harness.add_widget(target, RectI::new(0, 0, 800, 600));
        let widget_b = harness.add_widget(target, RectI::new(0, 0, 800, 600));

        let a = quad_element(&harness, "a", 9, RectI::new(0, 0, 50, 50), textured(1));
        let b = quad_element(&harness, "b", 5, RectI::new(100, 0, 50, 50), textured(1));
        harness.add_scripted(widget_a, a);
        harness.add_scripted(widget_b, b);

        assert_eq!(snapshot_textures(&mut harness), vec![1]);
        assert_eq!(harness.pool.live.len(), 1);
    }

    #[test]
    fn test_rebuild_releases_previous_meshes() {
        let (mut harness, widget) = single_window_harness();
        let a = quad_element(&harness, "a", 5, RectI::new(0, 0, 50, 50), textured(1));
        harness.add_scripted(widget, a);

        harness.update(0.016);
        assert_eq!(harness.pool.live.len(), 1);
        assert!(harness.pool.released.is_empty());

        // any widget change invalidates its cached batches
        harness
            .manager
            .widget_mut(widget)
            .unwrap()
            .set_world_transform(crate::foundation::math::Mat4::identity());
        harness.update(0.016);
        assert_eq!(harness.pool.live.len(), 1);
        assert_eq!(harness.pool.released.len(), 1);
    }

    #[test]
    fn test_allocation_failure_skips_batch() {
        let (mut harness, widget) = single_window_harness();
        let a = quad_element(&harness, "a", 5, RectI::new(0, 0, 50, 50), textured(1));
        harness.add_scripted(widget, a);

        harness.pool.fail_next = true;
        let snapshot = harness.update(0.016).expect("rebuild still happened");
        assert!(snapshot.per_camera.is_empty());
        assert!(harness.pool.live.is_empty());

        harness
            .manager
            .widget_mut(widget)
            .unwrap()
            .set_world_transform(crate::foundation::math::Mat4::identity());
        assert_eq!(snapshot_textures(&mut harness), vec![1]);
    }

    #[test]
    fn test_mixed_widget_batches_bake_widget_transform() {
        let mut harness = Harness::new();
        harness.manager = crate::manager::GuiManager::with_config(GuiConfig {
            separate_meshes_by_widget: false,
            ..GuiConfig::default()
        });
        let target = harness.add_window(WindowId(1), RectI::new(0, 0, 800, 600));
        let widget_a = harness.add_widget(target, RectI::new(0, 0, 800, 600));
        let widget_b = harness.add_widget(target, RectI::new(0, 0, 800, 600));
        harness
            .manager
            .widget_mut(widget_b)
            .unwrap()
            .set_world_transform(crate::foundation::math::Mat4::new_translation(
                &nalgebra::Vector3::new(300.0, 0.0, 0.0),
            ));

        let a = quad_element(&harness, "a", 9, RectI::new(0, 0, 50, 50), textured(1));
        let b = quad_element(&harness, "b", 5, RectI::new(10, 0, 50, 50), textured(1));
        harness.add_scripted(widget_a, a);
        harness.add_scripted(widget_b, b);

        harness.update(0.016);
        assert_eq!(harness.pool.live.len(), 1);
        let mesh = harness.pool.uploads.values().next().unwrap();
        // the second widget's quad is offset by its world transform
        assert!((mesh.vertices[4].position[0] - 310.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hidden_elements_contribute_no_geometry() {
        let (mut harness, widget) = single_window_harness();
        let mut a = quad_element(&harness, "a", 5, RectI::new(0, 0, 50, 50), textured(1));
        a.visible = false;
        harness.add_scripted(widget, a);

        let snapshot = harness.update(0.016).expect("initial rebuild");
        assert!(snapshot.per_camera.is_empty());
        assert!(harness.pool.live.is_empty());
    }

    #[test]
    fn test_snapshot_carries_widget_transform() {
        let (mut harness, widget) = single_window_harness();
        let a = quad_element(&harness, "a", 5, RectI::new(0, 0, 50, 50), textured(1));
        harness.add_scripted(widget, a);
        let transform =
            crate::foundation::math::Mat4::new_translation(&nalgebra::Vector3::new(5.0, 6.0, 0.0));
        harness
            .manager
            .widget_mut(widget)
            .unwrap()
            .set_world_transform(transform);

        let snapshot = harness.update(0.016).expect("rebuild");
        let entries = &snapshot.per_camera[&CameraId(1)];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].world_transform, transform);
    }
}
