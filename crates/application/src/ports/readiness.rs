/// Answers "has the initial snapshot been fully applied?".
pub trait ReadinessProbe: Send + Sync {
    fn is_ready(&self) -> bool;
}
