/*
 * Concolic Application Layer
 *
 * The shadow interpreter, the poisoning run wrapper and path exploration.
 */

mod exploration;
mod interpreter;
mod run;

pub use exploration::Explorer;
pub use interpreter::ShadowInterpreter;
pub use run::ConcolicRun;
