/// Configuration for the [`Evaluator`](crate::eval::Evaluator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Derive input/output nogoods for atoms that allow it.
    /// When off, only nogoods submitted by plugins are learned.
    pub input_output_learning: bool,
    /// Fail evaluations whose atom reports unknown tuples without declaring
    /// partial answers. When off, such tuples are dropped with a warning.
    pub strict_partial_answers: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            input_output_learning: true,
            strict_partial_answers: true,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_input_output_learning(mut self, on: bool) -> Self {
        self.input_output_learning = on;
        self
    }

    pub fn with_strict_partial_answers(mut self, on: bool) -> Self {
        self.strict_partial_answers = on;
        self
    }
}
