fn main() -> anyhow::Result<()> {
    report_filters::run()
}
