/// Read-only notes shown next to the model info pane
pub const DESIGN_NOTES: &str = "\
Design Notes:

• Encapsulation:
  TextModel and ImageModel each hold their inference backend privately.
  Callers only see run(), never the tokenizer, tensors or runtime setup
  behind it.

• Polymorphism (traits):
  Both adapters implement the InferenceAdapter trait, so they expose the
  same run() and descriptor() even though one takes text and the other a
  file path. Backends plug in through the Summarize and DetectObjects
  traits, which is how tests swap in scripted models.

• Composition over inheritance:
  The window does not extend a toolkit type. The application state owns a
  SessionController, which owns the two adapters, and every button press
  becomes an explicit method call on it.

• Typed results:
  A run returns Outcome::Success(payload) or Outcome::Failure(reason).
  A failing model never crashes the session; its error is shown in the
  output log like any other result.

• Mode-shaped input:
  The pending input is an enum whose variant is the selected mode, so a
  text buffer cannot linger after switching to image input.
";
