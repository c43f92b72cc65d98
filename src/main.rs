use clap::Parser;
use colored::*;
use cusearch::common::*;
use cusearch::cost::*;
use cusearch::encoder_context::*;
use cusearch::picture::Picture;
use cusearch::reconstruction::*;
use cusearch::reference_picture::*;
use cusearch::slice_searcher::*;
use cusearch::yuv_io::*;
use debug_print::*;
use std::fmt::Display;
use std::io;
use std::process;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to input raw video (8-bit YUV 4:2:0, - for stdin)
    #[clap(short, long)]
    input: String,
    /// Path to write the working reconstruction of every picture
    #[clap(short, long)]
    reconst: Option<String>,
    /// Input video resolution (WIDTHxHEIGHT)
    #[clap(long)]
    input_size: String,
    /// Number of pictures to search
    #[clap(long)]
    num_pictures: usize,
    /// Fixed quantization parameter for entire video stream
    #[clap(long, default_value_t = 22)]
    qp: usize,
    /// Max split depth of coding trees to search
    #[clap(long, default_value_t = 3)]
    max_split_depth: usize,
    /// Width of the largest coding unit
    #[clap(long, default_value_t = 64)]
    lcu_width: usize,
    /// Number of previous pictures kept for inter search
    #[clap(long, default_value_t = DEFAULT_REF_PIC_COUNT)]
    ref_pics: usize,
    /// Replace decided blocks with their prediction instead of keeping the source
    #[clap(long)]
    predict_reconst: bool,
    /// Extra parameters (PARAM1=VAL1[,PARAM2=VAL2,...])
    #[clap(long)]
    extra_params: Option<String>,
}

fn exit_with_error(message: impl Display) -> ! {
    eprintln!("{}: {}", "error".red(), message);
    process::exit(1);
}

fn main() {
    let args = Args::parse();

    let mut ectx = EncoderContext::new();

    let input_size = args
        .input_size
        .split('x')
        .map(|x| x.parse::<usize>())
        .collect::<Vec<Result<usize, std::num::ParseIntError>>>();
    let (width, height) = if let [Ok(width), Ok(height)] = input_size[..] {
        (width, height)
    } else {
        exit_with_error(format!("Invalid input-size: {}", args.input_size));
    };

    ectx.qp = args.qp;
    ectx.lcu_width = args.lcu_width;
    ectx.set_max_depth(args.max_split_depth);
    ectx.max_ref_pics = args.ref_pics;

    if let Some(extra_params) = &args.extra_params {
        for param in extra_params.split(',') {
            if let [key, val] = param.split('=').collect::<Vec<&str>>()[..] {
                ectx.extra_params.insert(key.to_string(), val.to_string());
            } else {
                exit_with_error(format!("Invalid extra-params: {}", extra_params));
            }
        }
    }
    if let Err(e) = ectx.apply_extra_params() {
        exit_with_error(e);
    }

    let lambda_table = LambdaTable::new();
    let mut searcher = match SliceSearcher::new(&ectx, &lambda_table) {
        Ok(searcher) => searcher,
        Err(e) => exit_with_error(e),
    };

    let stdin = io::stdin();
    let mut reader = if args.input == *"-" {
        YuvReader::standard(&stdin, width, height)
    } else {
        match YuvReader::file(&args.input, width, height) {
            Ok(f) => f,
            Err(e) => exit_with_error(format!("failed to open input file: {}", e)),
        }
    };

    let mut reconst_writer = args.reconst.as_ref().map(|path| match YuvWriter::file(path) {
        Ok(f) => f,
        Err(e) => exit_with_error(format!("failed to open reconst file: {}", e)),
    });

    let mut reconstructor: Box<dyn LcuReconstructor> = if args.predict_reconst {
        Box::new(PredictionReconstructor::new(ectx.log2_lcu_width()))
    } else {
        Box::new(KeepSource)
    };

    let mut refs = ReferencePictureList::new(ectx.max_ref_pics);
    let mut totals = SliceSummary::default();
    let mut num_searched = 0;
    for picture_index in 0..args.num_pictures {
        let luma = match reader.read_frame() {
            Ok(Some(luma)) => luma,
            Ok(None) => {
                debug_eprintln!("end of input after {} pictures", picture_index);
                break;
            }
            Err(e) => exit_with_error(e),
        };
        let slice_type = if picture_index == 0 {
            SliceType::SLICE_I
        } else {
            SliceType::SLICE_P
        };
        let mut picture = match Picture::from_luma(width, height, &luma, slice_type, &ectx) {
            Ok(picture) => picture,
            Err(e) => exit_with_error(e),
        };
        picture.picture_order_count = picture_index;

        let summary = match searcher.search_slice_data(&mut picture, &refs, reconstructor.as_mut()) {
            Ok(summary) => summary,
            Err(e) => exit_with_error(e),
        };
        eprintln!(
            "{} #{} {:?}: cost {}, {} intra / {} inter blocks",
            "picture".green(),
            picture_index,
            slice_type,
            summary.cost,
            summary.intra_blocks,
            summary.inter_blocks
        );
        totals.cost += summary.cost;
        totals.intra_blocks += summary.intra_blocks;
        totals.inter_blocks += summary.inter_blocks;
        totals.intra_samples += summary.intra_samples;
        totals.inter_samples += summary.inter_samples;
        num_searched += 1;

        if let Some(ref mut reconst_writer) = reconst_writer {
            if let Err(e) = reconst_writer.write_frame(&picture.get_reconst_pixels(), width, height)
            {
                exit_with_error(format!("failed to write reconst: {}", e));
            }
        }
        refs.push(Arc::new(picture));
    }

    let area = (totals.intra_samples + totals.inter_samples).max(1) as f64;
    eprintln!(
        "{}: {} pictures, cost {}, intra {:.1}% ({} blocks), inter {:.1}% ({} blocks)",
        "done".green().bold(),
        num_searched,
        totals.cost,
        100.0 * totals.intra_samples as f64 / area,
        totals.intra_blocks,
        100.0 * totals.inter_samples as f64 / area,
        totals.inter_blocks
    );
}
