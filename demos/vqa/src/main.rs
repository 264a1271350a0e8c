use argh::FromArgs;
use std::path::PathBuf;
use std::thread;

use glance_image::{Image, ImageSize};
use glance_vlm::{ModelBundle, SingleShotRunner, TitleSink};

fn default_prompt() -> String {
    "You are a driving assistant. Tell the driver if his driving space is enough to fit \
     his car or not. Answer in one sentence."
        .to_string()
}

#[derive(FromArgs)]
/// Ask a vision-language model one question about one image
struct Args {
    /// path to the compiled model bundle (.glance directory)
    #[argh(option, short = 'm')]
    model_path: PathBuf,

    /// path to an input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// question to ask about the image
    #[argh(option, short = 'p', default = "default_prompt()")]
    prompt: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();

    // decode the bitmap at its native resolution
    let decoded = image::open(&args.image_path)?.to_rgb8();
    let (width, height) = decoded.dimensions();
    let bitmap = Image::<u8, 3>::new(
        ImageSize {
            width: width as usize,
            height: height as usize,
        },
        decoded.into_raw(),
    )?;

    // load the model bundle; any failure here is fatal for the demo
    let loaded = ModelBundle::open(&args.model_path)?.load()?;
    let runner = SingleShotRunner::new(loaded);

    let (sink, titles) = TitleSink::channel();

    let worker = thread::spawn(move || {
        if let Err(e) = runner.run(&bitmap, &args.prompt, &sink) {
            log::error!("inference failed: {e}");
        }
    });

    // the main thread plays the UI role: show the title when it arrives
    if let Ok(title) = titles.recv() {
        println!("{title}");
    }

    if worker.join().is_err() {
        log::error!("inference thread panicked");
    }

    Ok(())
}
