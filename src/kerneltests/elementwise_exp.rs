use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "elementwise_exp",
    tests: &[TestCase {
        name: "matches_host_reference",
        run: matches_host_reference,
    }],
};

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 100;
    let input = data::uniform(N, -2.0, 2.0, 0x0e52_0001);
    let expected: Vec<f32> = input.iter().map(|&x| x.exp()).collect();

    let outputs = launch(
        ctx,
        program,
        "elementwise_exp",
        &[BufferSpec::InOut(&input)],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("elementwise_exp", &expected, &outputs[0])
}
