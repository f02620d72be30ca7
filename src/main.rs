use pcb_pivot::SceneConfig;

fn main() -> anyhow::Result<()> {
    pcb_pivot::run(SceneConfig::default())
}
