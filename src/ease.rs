/// Easing curves used by the interpolation primitive and the effect engines.
///
/// The formulas are deliberately unclamped: callers feed ratios straight out
/// of window arithmetic, and out-of-range inputs produce whatever the
/// polynomial yields, same as the timelines this compiler replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    OutQuad,
    InOutQuad,
    InOutExpo,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::OutQuad => -t * (t - 2.0),
            Self::InOutQuad => {
                let x = t / 0.5;
                if x < 1.0 {
                    0.5 * x * x
                } else {
                    -0.5 * ((x - 1.0) * (x - 3.0) - 1.0)
                }
            }
            Self::InOutExpo => {
                let x = t * 2.0;
                if x < 1.0 {
                    0.5 * 2f64.powf(10.0 * (x - 1.0))
                } else {
                    0.5 * (2.0 - 2f64.powf(-10.0 * (x - 1.0)))
                }
            }
        }
    }
}
