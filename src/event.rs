/// Actions raised by the UI during a frame and applied after the frame's
/// widget borrows are released.
#[derive(Debug, Clone)]
pub enum PlaygroundAction {
    Run,
    SaveProject,
    ShareProject,
    ResetBuffers,
    LoadChallenge(String),
    ImportShareToken(String),
    OpenProblem(String),
    RunProblemTests,
    RecordObservedOutputs(Vec<String>),
    SubmitProblem,
}
