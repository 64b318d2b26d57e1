use crate::domain::Finger;
use crate::fingering::Fingering;

/// Per-finger listing of a fingering, one line per finger.
///
/// ```text
/// 1: 1/5
/// 2: 2/3
/// 3: 3/2
/// 4: -
/// O: 0/4 0/6
/// ```
pub fn finger_diagram(fingering: &Fingering) -> String {
    let mut out = String::new();
    for finger in Finger::HAND.into_iter().chain([Finger::Open]) {
        let held = fingering.positions_of(finger);
        if finger == Finger::Open && held.is_empty() {
            continue;
        }
        let positions = if held.is_empty() {
            "-".to_string()
        } else {
            held.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
        };
        out.push_str(&format!("{}: {positions}\n", finger.label()));
    }
    out
}
