use crate::renderer::camera::CameraState;
use crate::renderer::renderer::{
    Renderer, SceneUniform, AMBIENT_COLOR, BACKGROUND_COLOR, FILL_LIGHT_COLOR,
    FILL_LIGHT_DIRECTION, KEY_LIGHT_COLOR, KEY_LIGHT_DIRECTION,
};
use crate::settings::DisplaySettings;
use egui_wgpu::ScreenDescriptor;

fn light_direction(toward_lamp: [f32; 3]) -> [f32; 4] {
    let dir = nalgebra_glm::normalize(&nalgebra_glm::vec3(
        toward_lamp[0],
        toward_lamp[1],
        toward_lamp[2],
    ));
    [dir.x, dir.y, dir.z, 0.0]
}

impl Renderer {
    pub fn render(
        &mut self,
        camera: &CameraState,
        display: &DisplaySettings,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        // Skip rendering if window size is invalid (minimized, not ready, etc.)
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(());
        }

        let aspect = self.config.width as f32 / self.config.height as f32;
        let proj = nalgebra_glm::perspective(
            aspect,
            display.fov_degrees.to_radians(),
            0.1,
            display.far_plane,
        );

        let eye = camera.eye();
        let up = nalgebra_glm::vec3(0.0, 1.0, 0.0); // Y-up coordinate system
        let view = nalgebra_glm::look_at(&eye, &camera.target, &up);
        let view_proj = proj * view;

        let scene_uniform = SceneUniform {
            view_proj: view_proj.into(),
            ambient_color: AMBIENT_COLOR,
            light_direction_0: light_direction(KEY_LIGHT_DIRECTION),
            light_color_0: KEY_LIGHT_COLOR,
            light_direction_1: light_direction(FILL_LIGHT_DIRECTION),
            light_color_1: FILL_LIGHT_COLOR,
        };
        self.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[scene_uniform]),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: BACKGROUND_COLOR[0],
                            g: BACKGROUND_COLOR[1],
                            b: BACKGROUND_COLOR[2],
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !self.draws.is_empty() {
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                let draw_batch = |render_pass: &mut wgpu::RenderPass, blended: bool| {
                    for draw in &self.draws {
                        let material =
                            draw.material.and_then(|index| self.materials.get(index));
                        if material.map(|m| m.alpha_blend).unwrap_or(false) != blended {
                            continue;
                        }

                        let texture_bind_group = material
                            .and_then(|m| m.base_color_image)
                            .and_then(|index| self.image_bind_groups.get(index))
                            .unwrap_or(&self.white_bind_group);
                        let material_bind_group = draw
                            .material
                            .and_then(|index| self.material_bind_groups.get(index))
                            .unwrap_or(&self.default_material_bind_group);

                        render_pass.set_bind_group(1, texture_bind_group, &[]);
                        render_pass.set_bind_group(2, material_bind_group, &[]);
                        render_pass.draw_indexed(
                            draw.index_start..(draw.index_start + draw.index_count),
                            0,
                            0..1,
                        );
                    }
                };

                // Opaque materials first with depth writes, then blended ones on top
                render_pass.set_pipeline(&self.opaque_pipeline);
                draw_batch(&mut render_pass, false);

                render_pass.set_pipeline(&self.blend_pipeline);
                draw_batch(&mut render_pass, true);
            }
        }

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut egui_rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_rpass, &paint_jobs, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
