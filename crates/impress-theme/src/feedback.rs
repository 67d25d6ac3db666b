//! Transient copy feedback on the trigger control.

use std::rc::Rc;

use crate::config::ClipboardConfig;
use crate::document::Document;
use crate::platform::Timers;

/// Replace the trigger's content with the icon and `message`, mark it
/// copied, and restore both after the configured delay.
///
/// Repeated calls are not serialized: a second call inside the window
/// captures the feedback markup as "original" and each timer restores what
/// its own call saw. Last invocation wins.
pub fn show_copy_feedback<D: Document>(
    doc: &Rc<D>,
    timers: &dyn Timers,
    config: &ClipboardConfig,
    trigger: &D::Node,
    message: &str,
) {
    let original = doc.inner_html(trigger);
    doc.set_inner_html(trigger, &format!("{} {}", config.feedback_icon, message));
    doc.add_class(trigger, &config.copied_class);

    let doc = Rc::clone(doc);
    let trigger = trigger.clone();
    let copied_class = config.copied_class.clone();
    timers.set_timeout(
        config.feedback_delay(),
        Box::new(move || {
            doc.set_inner_html(&trigger, &original);
            doc.remove_class(&trigger, &copied_class);
        }),
    );
}
