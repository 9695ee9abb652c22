/// Execution classes used to label background work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Blocking I/O work such as mapping or installing data files.
	IoBlocking,
	/// CPU-intensive work such as deserializing dictionaries and model tables.
	CpuBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::IoBlocking => "io_blocking",
			Self::CpuBlocking => "cpu_blocking",
		}
	}
}
