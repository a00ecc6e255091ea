//! Interactive renderer, a kiss3d window with the globe, one node per object
//! and a HUD panel on the left.
//!
//! The window area right of the HUD panel is the layout container; window
//! framebuffer resizes are forwarded to [`ResizeEvents`].

use crate::{
    events::ResizeEvents,
    marker::MarkerTemplate,
    propagation::RenderableObject,
    renderer::{GlobeRenderer, RenderFrame, RendererError},
    viewport::{LayoutHost, SharedLayout},
};
use globe_types::prelude::{CanvasSize, Margins, Rect};
use kiss3d::{
    camera::ArcBall,
    event::{Action, Key, WindowEvent},
    light::Light,
    nalgebra::{Point2, Point3, Vector3},
    resource::Mesh,
    scene::SceneNode,
    text::Font,
    window::Window,
};
use std::{cell::RefCell, fmt::Write, rc::Rc};
use tracing::{debug, info};

pub const GLOBE_RADIUS: f64 = 100.0;
pub const HUD_WIDTH: f64 = 320.0;
pub const HUD_TEXT_SCALE: f32 = 40.0;

const EARTH_RGB: [f32; 3] = [0.16, 0.32, 0.75];

/// The window as seen by the viewport sync
#[derive(Debug)]
pub struct WindowLayout {
    hud_width: f64,
    size: CanvasSize,
    margins: Margins,
}

impl LayoutHost for WindowLayout {
    fn container_rect(&self) -> Rect {
        Rect {
            top: 0.0,
            left: self.hud_width,
            width: (self.size.width - self.hud_width).max(0.0),
            height: self.size.height,
        }
    }

    fn viewport_size(&self) -> CanvasSize {
        self.size
    }

    fn set_inner_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }
}

pub struct GuiRenderer {
    window: Window,
    cam: ArcBall,
    font: Rc<Font>,
    text_buf: String,
    hud_visibility: bool,

    layout: Rc<RefCell<WindowLayout>>,
    events: ResizeEvents,

    template: Option<Rc<MarkerTemplate>>,
    mesh: Option<Rc<RefCell<Mesh>>>,
    marker_color: [f32; 3],
    object_nodes: Vec<SceneNode>,
    canvas: Option<CanvasSize>,
}

impl GuiRenderer {
    pub fn new(win_title: &str, events: &ResizeEvents) -> Self {
        let eye = Point3::new(0.0, 0.0, (GLOBE_RADIUS * 4.0) as f32);
        let cam = ArcBall::new(eye, Point3::origin());

        let mut window = Window::new(win_title);
        window.set_light(Light::StickToCamera);
        window.set_framerate_limit(None);

        let mut earth = window.add_sphere(GLOBE_RADIUS as f32);
        earth.set_color(EARTH_RGB[0], EARTH_RGB[1], EARTH_RGB[2]);

        let size = CanvasSize {
            width: f64::from(window.width()),
            height: f64::from(window.height()),
        };

        println!("----------------------------------------------");
        println!("|                 GUI key map                |");
        println!("----------------------------------------------");
        println!("'i'   : toggle HUD visibility");
        println!("ESC   : exit");
        println!("----------------------------------------------");

        Self {
            window,
            cam,
            font: Font::default(),
            text_buf: String::with_capacity(1024),
            hud_visibility: true,
            layout: Rc::new(RefCell::new(WindowLayout {
                hud_width: HUD_WIDTH,
                size,
                margins: Margins::default(),
            })),
            events: events.clone(),
            template: None,
            mesh: None,
            marker_color: [1.0, 1.0, 1.0],
            object_nodes: Vec::new(),
            canvas: None,
        }
    }

    pub fn layout(&self) -> SharedLayout {
        self.layout.clone()
    }

    fn draw_hud(&mut self, frame: &RenderFrame) {
        let color = Point3::new(1.0, 1.0, 1.0);
        let lines = [
            format!("{}", frame.time),
            format!("Frame: {}", frame.index),
            format!("Objects: {}", self.object_nodes.len()),
        ];
        let mut origin = Point2::origin();
        for line in lines.iter() {
            self.window
                .draw_text(line, &origin, HUD_TEXT_SCALE, &self.font, &color);
            origin.y += HUD_TEXT_SCALE;
        }

        self.text_buf.clear();
        if let Some(c) = self.canvas {
            let _ = write!(&mut self.text_buf, "Canvas: {c}");
        }
        if let Some(t) = self.template.as_ref() {
            let _ = write!(&mut self.text_buf, "  Marker: {:.3}", t.circumradius);
        }
        self.window
            .draw_text(&self.text_buf, &origin, HUD_TEXT_SCALE, &self.font, &color);

        let margins = self.layout.borrow().margins;
        origin.y += HUD_TEXT_SCALE;
        self.window.draw_text(
            &format!("Margins: {margins}"),
            &origin,
            HUD_TEXT_SCALE,
            &self.font,
            &color,
        );
    }

    fn clear_objects(&mut self) {
        for mut n in self.object_nodes.drain(..) {
            self.window.remove_node(&mut n);
        }
    }
}

impl<S> GlobeRenderer<S> for GuiRenderer {
    fn scene_radius(&self) -> f64 {
        GLOBE_RADIUS
    }

    fn point_of_view(&mut self, altitude: f64) {
        self.cam.set_dist((GLOBE_RADIUS * (1.0 + altitude)) as f32);
    }

    fn set_objects(&mut self, objects: &[RenderableObject<S>]) {
        let Some(mesh) = self.mesh.clone() else {
            return;
        };

        for (idx, obj) in objects.iter().enumerate() {
            let p = obj.position(GLOBE_RADIUS);
            let t = Vector3::new(p.x as f32, p.y as f32, p.z as f32);
            match self.object_nodes.get_mut(idx) {
                Some(n) => n.set_local_translation(t.into()),
                None => {
                    let mut n = self.window.add_mesh(mesh.clone(), Vector3::new(1.0, 1.0, 1.0));
                    n.set_color(self.marker_color[0], self.marker_color[1], self.marker_color[2]);
                    n.set_local_translation(t.into());
                    self.object_nodes.push(n);
                }
            }
        }

        for mut n in self.object_nodes.drain(objects.len()..) {
            self.window.remove_node(&mut n);
        }
    }

    fn set_object_template(&mut self, template: Option<Rc<MarkerTemplate>>) {
        self.clear_objects();
        self.mesh = template.as_ref().map(|t| {
            let coords = t
                .vertices
                .iter()
                .map(|v| Point3::new(v.x, v.y, v.z))
                .collect();
            let faces = t
                .faces
                .iter()
                .map(|[a, b, c]| Point3::new(*a, *b, *c))
                .collect();
            Rc::new(RefCell::new(Mesh::new(coords, faces, None, None, false)))
        });
        if let Some(t) = template.as_ref() {
            self.marker_color = t.color_f32();
            debug!(radius = t.circumradius, "Marker mesh ready");
        }
        self.template = template;
    }

    fn set_canvas_size(&mut self, size: CanvasSize) {
        self.canvas = Some(size);
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<bool, RendererError> {
        if self.hud_visibility {
            self.draw_hud(frame);
        }

        let kr = self.window.render_with_camera(&mut self.cam);

        let mut resized = false;
        for event in self.window.events().iter() {
            match event.value {
                WindowEvent::FramebufferSize(w, h) => {
                    self.layout.borrow_mut().size = CanvasSize {
                        width: f64::from(w),
                        height: f64::from(h),
                    };
                    resized = true;
                }
                WindowEvent::Key(Key::I, Action::Press, _) => {
                    self.hud_visibility = !self.hud_visibility;
                }
                _ => (),
            }
        }
        if resized {
            self.events.dispatch();
        }

        if !kr {
            info!("Window closed");
        }
        Ok(kr)
    }
}
