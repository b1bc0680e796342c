use crate::text_metrics;

/// Relative size of exponent runs, matching TeX's script style.
pub const SCRIPT_SCALE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    /// `\mathbb{R}^{n}`
    Reals(u32),
    /// A matrix group such as `SE(2)`.
    Group { name: &'static str, n: u32 },
}

/// A math-mode label: a product of factors joined by `\times`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathLabel {
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStyle {
    Upright,
    Italic,
    Superscript,
}

/// A contiguous piece of label text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl MathLabel {
    pub fn new(factors: Vec<Factor>) -> Self {
        Self { factors }
    }

    /// LaTeX source of the label, e.g. `$SE(2)\times \mathbb{R}^{6}$`.
    pub fn latex(&self) -> String {
        let body: Vec<String> = self
            .factors
            .iter()
            .map(|factor| match factor {
                Factor::Reals(n) => format!(r"\mathbb{{R}}^{{{n}}}"),
                Factor::Group { name, n } => format!("{name}({n})"),
            })
            .collect();
        format!("${}$", body.join(r"\times "))
    }

    pub fn runs(&self) -> Vec<Run> {
        let mut runs = Vec::new();
        for (idx, factor) in self.factors.iter().enumerate() {
            if idx > 0 {
                push_run(&mut runs, " × ", RunStyle::Upright);
            }
            match factor {
                Factor::Reals(n) => {
                    push_run(&mut runs, "ℝ", RunStyle::Upright);
                    push_run(&mut runs, &n.to_string(), RunStyle::Superscript);
                }
                Factor::Group { name, n } => {
                    push_run(&mut runs, name, RunStyle::Italic);
                    push_run(&mut runs, &format!("({n})"), RunStyle::Upright);
                }
            }
        }
        runs
    }

    /// Plain-text rendering used in log output.
    pub fn plain(&self) -> String {
        self.runs()
            .iter()
            .map(|run| match run.style {
                RunStyle::Superscript => format!("^{}", run.text),
                _ => run.text.clone(),
            })
            .collect()
    }

    /// Advance width of the typeset label at `font_size` pixels.
    pub fn measure_width(&self, font_family: &str, font_size: f32) -> f32 {
        self.runs()
            .iter()
            .map(|run| {
                let size = match run.style {
                    RunStyle::Superscript => font_size * SCRIPT_SCALE,
                    _ => font_size,
                };
                text_metrics::measure_text_width(&run.text, size, font_family)
                    .unwrap_or_else(|| text_metrics::fallback_width(&run.text, size))
            })
            .sum()
    }
}

fn push_run(runs: &mut Vec<Run>, text: &str, style: RunStyle) {
    if let Some(last) = runs.last_mut()
        && last.style == style
    {
        last.text.push_str(text);
        return;
    }
    runs.push(Run {
        text: text.to_string(),
        style,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_label_runs() {
        let label = MathLabel::new(vec![
            Factor::Group { name: "SE", n: 2 },
            Factor::Reals(6),
        ]);
        let runs = label.runs();
        let styles: Vec<RunStyle> = runs.iter().map(|run| run.style).collect();
        assert_eq!(
            styles,
            vec![
                RunStyle::Italic,
                RunStyle::Upright,
                RunStyle::Superscript
            ]
        );
        assert_eq!(runs[1].text, "(2) × ℝ");
        assert_eq!(label.plain(), "SE(2) × ℝ^6");
    }

    #[test]
    fn latex_matches_source_figures() {
        let label = MathLabel::new(vec![Factor::Reals(12)]);
        assert_eq!(label.latex(), r"$\mathbb{R}^{12}$");
        let label = MathLabel::new(vec![Factor::Group { name: "SO", n: 3 }]);
        assert_eq!(label.latex(), "$SO(3)$");
    }

    #[test]
    fn wider_labels_measure_wider() {
        let short = MathLabel::new(vec![Factor::Group { name: "SO", n: 2 }]);
        let long = MathLabel::new(vec![
            Factor::Group { name: "SO", n: 2 },
            Factor::Reals(6),
        ]);
        let family = "serif";
        assert!(long.measure_width(family, 20.0) > short.measure_width(family, 20.0));
        assert!(short.measure_width(family, 20.0) > 0.0);
    }
}
