use orbitscene_common::{ControlSettings, SCALE_MAX, SCALE_STEP};

/// One field edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    RotationSpeed(f32),
    LightIntensity(f32),
    AutoRotate(bool),
    Wireframe(bool),
}

type Listener = Box<dyn FnMut(ControlSettings)>;

/// Editable [`ControlSettings`] with a single change listener.
///
/// On every effective change the panel builds a new snapshot and hands the
/// whole value to the listener.
pub struct SettingsPanel {
    settings: ControlSettings,
    listener: Option<Listener>,
    notifications: u64,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new(ControlSettings::default())
    }
}

impl std::fmt::Debug for SettingsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPanel")
            .field("settings", &self.settings)
            .field("has_listener", &self.listener.is_some())
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl SettingsPanel {
    pub fn new(initial: ControlSettings) -> Self {
        Self {
            settings: ControlSettings {
                rotation_speed: clamp_scale(initial.rotation_speed).unwrap_or(1.0),
                light_intensity: clamp_scale(initial.light_intensity).unwrap_or(1.0),
                ..initial
            },
            listener: None,
            notifications: 0,
        }
    }

    /// Install the listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl FnMut(ControlSettings) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn with_listener(mut self, listener: impl FnMut(ControlSettings) + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> ControlSettings {
        self.settings
    }

    /// Number of snapshots handed to the listener so far.
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Apply one edit. Returns the new snapshot if the value changed.
    ///
    /// Scalars are clamped to the slider range; non-finite scalars are
    /// ignored.
    pub fn apply(&mut self, change: SettingsChange) -> Option<ControlSettings> {
        let mut next = self.settings;
        match change {
            SettingsChange::RotationSpeed(v) => next.rotation_speed = clamp_scale(v)?,
            SettingsChange::LightIntensity(v) => next.light_intensity = clamp_scale(v)?,
            SettingsChange::AutoRotate(on) => next.auto_rotate = on,
            SettingsChange::Wireframe(on) => next.wireframe = on,
        }
        if next == self.settings {
            return None;
        }
        self.settings = next;
        self.notify();
        Some(next)
    }

    fn notify(&mut self) {
        self.notifications += 1;
        tracing::debug!(settings = ?self.settings, "settings changed");
        if let Some(listener) = &mut self.listener {
            listener(self.settings);
        }
    }

    /// Draw the panel contents and apply whatever the user edited.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading("Interactive Controls");
        ui.separator();

        let mut edited = self.settings;
        ui.label("Rotation Speed");
        ui.add(
            egui::Slider::new(&mut edited.rotation_speed, 0.0..=SCALE_MAX)
                .step_by(SCALE_STEP as f64)
                .fixed_decimals(1)
                .suffix("x"),
        );
        ui.label("Light Intensity");
        ui.add(
            egui::Slider::new(&mut edited.light_intensity, 0.0..=SCALE_MAX)
                .step_by(SCALE_STEP as f64)
                .fixed_decimals(1)
                .suffix("x"),
        );
        ui.checkbox(&mut edited.auto_rotate, "Auto Rotate");
        ui.checkbox(&mut edited.wireframe, "Wireframe Mode");

        for change in changes_between(&self.settings, &edited) {
            self.apply(change);
        }

        ui.separator();
        ui.heading("About");
        ui.label("5 rotating 3D objects");
        ui.label("Ambient, directional and point lighting");
        ui.label("Shadows from the key light");
        ui.label("Phong materials on a lit ground plane");
    }
}

fn clamp_scale(v: f32) -> Option<f32> {
    v.is_finite().then(|| v.clamp(0.0, SCALE_MAX))
}

/// Field-by-field edits turning `from` into `to`.
fn changes_between(from: &ControlSettings, to: &ControlSettings) -> Vec<SettingsChange> {
    let mut out = Vec::new();
    if from.rotation_speed != to.rotation_speed {
        out.push(SettingsChange::RotationSpeed(to.rotation_speed));
    }
    if from.light_intensity != to.light_intensity {
        out.push(SettingsChange::LightIntensity(to.light_intensity));
    }
    if from.auto_rotate != to.auto_rotate {
        out.push(SettingsChange::AutoRotate(to.auto_rotate));
    }
    if from.wireframe != to.wireframe {
        out.push(SettingsChange::Wireframe(to.wireframe));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_panel() -> (SettingsPanel, Rc<RefCell<Vec<ControlSettings>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let panel = SettingsPanel::default().with_listener(move |s| sink.borrow_mut().push(s));
        (panel, seen)
    }

    #[test]
    fn change_notifies_with_full_snapshot() {
        let (mut panel, seen) = recording_panel();
        panel.apply(SettingsChange::Wireframe(true));
        panel.apply(SettingsChange::RotationSpeed(0.5));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].wireframe);
        assert_eq!(seen[0].rotation_speed, 1.0);
        assert!(seen[1].wireframe);
        assert_eq!(seen[1].rotation_speed, 0.5);
        assert!(seen[1].auto_rotate);
    }

    #[test]
    fn unchanged_value_does_not_notify() {
        let (mut panel, seen) = recording_panel();
        assert!(panel.apply(SettingsChange::AutoRotate(true)).is_none());
        assert!(panel.apply(SettingsChange::LightIntensity(1.0)).is_none());
        assert!(seen.borrow().is_empty());
        assert_eq!(panel.notifications(), 0);
    }

    #[test]
    fn scalars_clamp_to_slider_range() {
        let mut panel = SettingsPanel::default();
        panel.apply(SettingsChange::RotationSpeed(5.0));
        assert_eq!(panel.settings().rotation_speed, SCALE_MAX);
        panel.apply(SettingsChange::LightIntensity(-3.0));
        assert_eq!(panel.settings().light_intensity, 0.0);
        assert!(panel.settings().validate().is_ok());
    }

    #[test]
    fn non_finite_scalar_is_ignored() {
        let (mut panel, seen) = recording_panel();
        assert!(panel.apply(SettingsChange::RotationSpeed(f32::NAN)).is_none());
        assert_eq!(panel.settings(), ControlSettings::default());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn initial_values_are_clamped() {
        let panel = SettingsPanel::new(ControlSettings {
            rotation_speed: 9.0,
            light_intensity: f32::INFINITY,
            ..ControlSettings::default()
        });
        assert_eq!(panel.settings().rotation_speed, SCALE_MAX);
        assert_eq!(panel.settings().light_intensity, 1.0);
    }

    #[test]
    fn replacing_listener_keeps_one_receiver() {
        let (mut panel, first) = recording_panel();
        let second = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&second);
        panel.set_listener(move |_| *counter.borrow_mut() += 1);
        panel.apply(SettingsChange::Wireframe(true));
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn diff_lists_changed_fields_only() {
        let a = ControlSettings::default();
        let b = ControlSettings {
            wireframe: true,
            light_intensity: 0.3,
            ..a
        };
        assert_eq!(
            changes_between(&a, &b),
            vec![
                SettingsChange::LightIntensity(0.3),
                SettingsChange::Wireframe(true)
            ]
        );
    }

    #[test]
    fn panel_renders_in_headless_context() {
        let ctx = egui::Context::default();
        let mut panel = SettingsPanel::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| panel.show(ui));
        });
        assert_eq!(panel.notifications(), 0);
    }
}
