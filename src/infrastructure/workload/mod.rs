mod simulated_workload;

pub use simulated_workload::{
    HIGH_PRIORITY_UNITS, LOW_PRIORITY_UNITS, MEMORY_MB_RANGE, PEAK_CPU_RANGE, SimulatedWorkload,
    sample_usage,
};
